//! Tag catalog and batched, coalesced reads
//!
//! [`TagMaster`] wraps a [`Master`] with a catalog of named tags. A read of
//! an arbitrary selection of tags is planned into the minimum sequence of
//! contiguous-range requests that honors the protocol's 125-register limit
//! and the configured exclusion lists, executed request by request, and
//! handed back as addressed register buffers for typed retrieval.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use crate::buffer::RegisterBuffer;
use crate::bytes::{RegisterType, RegisterValue, REGISTER_TYPE_COUNT};
use crate::constants::MAX_MODBUS_REGISTERS;
use crate::error::{ModbusError, ModbusResult};
use crate::master::Master;
use crate::tag::{Tag, TagValue};
use crate::transport::StreamDevice;

/// One planned contiguous read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub register_type: RegisterType,
    pub start_address: u16,
    pub quantity: u16,
}

/// A [`Master`] with a tag catalog and a read-request planner.
pub struct TagMaster<D: StreamDevice> {
    master: Master<D>,
    tags: Vec<Tag>,
    key_index: HashMap<String, usize>,
    excluded_tags: HashSet<String>,
    excluded_registers: [BTreeSet<u16>; REGISTER_TYPE_COUNT],
}

impl<D: StreamDevice> TagMaster<D> {
    fn new(master: Master<D>) -> Self {
        Self {
            master,
            tags: Vec::new(),
            key_index: HashMap::new(),
            excluded_tags: HashSet::new(),
            excluded_registers: Default::default(),
        }
    }

    /// Tag master speaking the TCP-framed encoding.
    pub fn tcp(device: D) -> Self {
        Self::new(Master::tcp(device))
    }

    /// Tag master speaking the RTU encoding.
    pub fn rtu(device: D) -> Self {
        Self::new(Master::rtu(device))
    }

    pub fn master(&self) -> &Master<D> {
        &self.master
    }

    pub fn master_mut(&mut self) -> &mut Master<D> {
        &mut self.master
    }

    // ------------------------------------------------------------------
    // Catalog management
    // ------------------------------------------------------------------

    /// Replace the catalog. Tags are kept sorted by (register type,
    /// register number) and indexed by key.
    pub fn register_tags(&mut self, tags: Vec<Tag>) {
        self.clear_tags();
        self.tags = tags;
        self.tags
            .sort_by_key(|tag| (tag.register_type, tag.register_number));
        for (index, tag) in self.tags.iter().enumerate() {
            self.key_index.insert(tag.key.clone(), index);
        }
        debug!(count = self.tags.len(), "tag catalog registered");
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
        self.key_index.clear();
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&Tag> {
        self.key_index.get(key).map(|&index| &self.tags[index])
    }

    /// Drop a tag from every future selection.
    pub fn exclude_tag(&mut self, key: impl Into<String>) {
        self.excluded_tags.insert(key.into());
    }

    /// Forbid a register number from being swept over by a coalesced read.
    pub fn exclude_register(&mut self, register_type: RegisterType, register_number: u16) {
        self.excluded_registers[register_type.index()].insert(register_number);
    }

    pub fn clear_exclusions(&mut self) {
        self.excluded_tags.clear();
        for set in &mut self.excluded_registers {
            set.clear();
        }
    }

    // ------------------------------------------------------------------
    // Planner
    // ------------------------------------------------------------------

    /// Plan the minimum sequence of contiguous reads covering `keys`.
    ///
    /// Unknown and excluded keys are discarded; the selection is sorted by
    /// (register type, register number) and coalesced greedily. A tag joins
    /// the open request iff the register type matches, the tag's span
    /// touches or overlaps the request's covered range (no address gap),
    /// the combined span stays within the 125-register limit and no
    /// excluded register falls inside `[start_address, tag.register_number]`.
    pub fn plan_read_requests(&self, keys: &[&str]) -> Vec<ReadRequest> {
        let selection: Vec<&Tag> = keys
            .iter()
            .copied()
            .filter(|key| !self.excluded_tags.contains(*key))
            .filter_map(|key| self.tag(key))
            .collect();
        self.plan_for_tags(selection)
    }

    /// Plan for direct tag references instead of catalog keys.
    pub fn plan_read_requests_for(&self, tags: &[&Tag]) -> Vec<ReadRequest> {
        let selection: Vec<&Tag> = tags
            .iter()
            .copied()
            .filter(|tag| !self.excluded_tags.contains(&tag.key))
            .collect();
        self.plan_for_tags(selection)
    }

    fn plan_for_tags(&self, mut selection: Vec<&Tag>) -> Vec<ReadRequest> {
        let mut requests: Vec<ReadRequest> = Vec::new();
        if selection.is_empty() {
            return requests;
        }
        selection.sort_by_key(|tag| (tag.register_type, tag.register_number));

        for tag in selection {
            let Some(current) = requests.last_mut() else {
                requests.push(ReadRequest {
                    register_type: tag.register_type,
                    start_address: tag.register_number,
                    quantity: tag.register_length,
                });
                continue;
            };

            let same_type = current.register_type == tag.register_type;
            let distance = i32::from(tag.register_number) - i32::from(current.start_address);
            let register_end =
                (distance + i32::from(tag.register_length)).max(i32::from(current.quantity));
            let within_limit = register_end <= i32::from(MAX_MODBUS_REGISTERS);
            // A gap between the covered range and this tag would sweep
            // registers nobody asked for; some slaves reject such reads.
            let contiguous = distance <= i32::from(current.quantity);
            let swept_range_free = !self.has_excluded_register(
                tag.register_type,
                current.start_address,
                tag.register_number,
            );

            if same_type && within_limit && contiguous && swept_range_free {
                current.quantity = register_end as u16;
            } else {
                requests.push(ReadRequest {
                    register_type: tag.register_type,
                    start_address: tag.register_number,
                    quantity: tag.register_length,
                });
            }
        }
        requests
    }

    /// Whether any excluded register of `register_type` falls inside the
    /// closed range between the two register numbers.
    fn has_excluded_register(&self, register_type: RegisterType, first: u16, last: u16) -> bool {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        self.excluded_registers[register_type.index()]
            .range(first..=last)
            .next()
            .is_some()
    }

    // ------------------------------------------------------------------
    // Batched read
    // ------------------------------------------------------------------

    /// Plan and execute the reads covering `keys`, one buffer per planned
    /// request.
    ///
    /// A slave exception on one request skips that buffer and continues
    /// with the rest; transport and framing failures abort the batch.
    pub async fn read(
        &mut self,
        slave_id: u8,
        keys: &[&str],
    ) -> ModbusResult<Vec<RegisterBuffer>> {
        let requests = self.plan_read_requests(keys);
        let mut buffers = Vec::with_capacity(requests.len());
        for request in requests {
            let mut buffer = RegisterBuffer::new(
                request.start_address,
                request.register_type,
                request.quantity,
            );
            match self.master.read_into(slave_id, &mut buffer.view()).await {
                Ok(()) => buffers.push(buffer),
                Err(error @ ModbusError::Exception { .. }) => {
                    warn!(slave_id, ?request, %error, "tag read request rejected by slave");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(buffers)
    }

    /// Typed value of a tag out of the buffers a batched read returned.
    pub fn value<T: RegisterValue>(
        &self,
        buffers: &[RegisterBuffer],
        key: &str,
    ) -> ModbusResult<T> {
        let (tag, buffer) = self.locate(buffers, key)?;
        buffer.get(tag.register_number)
    }

    /// Dynamically typed value of a tag, decoded per its descriptor.
    pub fn tag_value(&self, buffers: &[RegisterBuffer], key: &str) -> ModbusResult<TagValue> {
        let (tag, buffer) = self.locate(buffers, key)?;
        let offset = usize::from(tag.register_number - buffer.start_address());
        tag.decode_value(&buffer.registers()[offset..])
    }

    fn locate<'a>(
        &'a self,
        buffers: &'a [RegisterBuffer],
        key: &str,
    ) -> ModbusResult<(&'a Tag, &'a RegisterBuffer)> {
        let tag = self
            .tag(key)
            .ok_or_else(|| ModbusError::invalid_argument(format!("unknown tag key: {key}")))?;
        let buffer = buffers
            .iter()
            .find(|buffer| {
                buffer.contains(tag.register_type, tag.register_number, tag.register_length)
            })
            .ok_or(ModbusError::OutOfRange {
                address: tag.register_number,
            })?;
        Ok((tag, buffer))
    }
}

// ============================================================================
// Tests
// ============================================================================
