//! Derived LWB protocol constants.
//!
//! Everything here is a pure function of the configuration, the Gloria
//! model and the slot timing table. Fixed slots are looked up in the table
//! rather than recomputed, so they share its rounding.

use super::slot_table::{RangeError, SlotTimingTable, MAX_FRAME_LENGTH};
use crate::config::LwbConfig;
use crate::gloria::GloriaModel;

/// Scalar and per-modulation constants of the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConstants {
    pub schedule_granularity: u64,
    pub sync_period: u64,
    pub timer_frequency_hz: u64,
    pub contention_header_length: u64,
    pub data_header_length: u64,
    pub max_data_payload: u64,
    pub slot_schedule_header_length: u64,
    pub slot_schedule_item_length: u64,
    pub round_schedule_item_length: u64,
    pub round_schedule_item_count: u64,
    pub round_schedule_length: u64,
    pub mod_count: u64,
    pub power_count: u64,
    /// Sync slot (header-only flood) per modulation.
    pub sync_slot_times: Vec<u64>,
    /// Acknowledged contention slot per modulation.
    pub contention_slot_times: Vec<u64>,
    /// Slot schedule slot per modulation.
    pub slot_schedule_slot_times: Vec<u64>,
    /// Round schedule slot per modulation.
    pub round_schedule_slot_times: Vec<u64>,
    /// Largest data payload per modulation before taking the minimum.
    pub max_payload_per_modulation: Vec<u64>,
}

/// Check that a fixed frame fits the radio and return its payload length.
fn frame_payload(
    frame: &'static str,
    modulation: Option<usize>,
    payload: u64,
    header: u64,
) -> Result<usize, RangeError> {
    let length = payload.saturating_add(header);
    if length > MAX_FRAME_LENGTH as u64 {
        return Err(RangeError::FrameTooLong {
            frame,
            modulation,
            length,
            max: MAX_FRAME_LENGTH,
        });
    }
    Ok(payload as usize)
}

fn lookup(value: Option<u64>, modulation: usize, payload: usize) -> Result<u64, RangeError> {
    value.ok_or(RangeError::SlotOverflow {
        modulation,
        payload,
    })
}

impl ProtocolConstants {
    /// Derive every constant.
    ///
    /// `model` and `table` must have been built from `config`.
    pub fn derive(
        config: &LwbConfig,
        model: &GloriaModel,
        table: &SlotTimingTable,
    ) -> Result<Self, RangeError> {
        let header = config.gloria_header_length as u64;
        let mod_count = model.mod_count() as u64;

        let round_schedule_item_count =
            mod_count * config.round_schedule_items_per_modulation as u64;
        let round_schedule_items_bytes =
            config.round_schedule_item_length as u64 * round_schedule_item_count;
        let round_schedule_length = round_schedule_items_bytes + header;
        let round_payload = frame_payload("round schedule", None, round_schedule_items_bytes, header)?;
        let contention_payload = frame_payload(
            "contention request",
            None,
            config.contention_field_length as u64,
            header,
        )?;

        let mut sync_slot_times = Vec::with_capacity(model.mod_count());
        let mut contention_slot_times = Vec::with_capacity(model.mod_count());
        let mut slot_schedule_slot_times = Vec::with_capacity(model.mod_count());
        let mut round_schedule_slot_times = Vec::with_capacity(model.mod_count());
        let mut max_payload_per_modulation = Vec::with_capacity(model.mod_count());

        let max_data_payload_index = MAX_FRAME_LENGTH - header as usize;

        for (m, &slot_count) in model.slot_counts().iter().enumerate() {
            let slot_schedule_payload = frame_payload(
                "slot schedule",
                Some(m),
                slot_count as u64 * config.slot_schedule_item_length as u64,
                header,
            )?;

            let sync = lookup(table.slot_time(m, 0), m, 0)?;
            let contention = lookup(
                table.slot_acked_time(m, contention_payload),
                m,
                contention_payload,
            )?;
            let slot_schedule = lookup(
                table.slot_time(m, slot_schedule_payload),
                m,
                slot_schedule_payload,
            )?;
            let round_schedule = lookup(table.slot_time(m, round_payload), m, round_payload)?;

            let schedule_ticks = slot_schedule.saturating_add(round_schedule);
            let budget = config.sync_period.checked_sub(schedule_ticks).ok_or(
                RangeError::NoRoomForData {
                    modulation: m,
                    schedule_ticks,
                    sync_period: config.sync_period,
                },
            )?;
            let max_payload = table
                .largest_payload_within(m, max_data_payload_index, budget)
                .ok_or(RangeError::NoPayloadFits {
                    modulation: m,
                    budget,
                })?;

            log::debug!(
                "Modulation {}: sync {} contention {} slot schedule {} round schedule {} ticks, max payload {} bytes",
                m,
                sync,
                contention,
                slot_schedule,
                round_schedule,
                max_payload
            );

            sync_slot_times.push(sync);
            contention_slot_times.push(contention);
            slot_schedule_slot_times.push(slot_schedule);
            round_schedule_slot_times.push(round_schedule);
            max_payload_per_modulation.push(max_payload as u64);
        }

        let max_data_payload = max_payload_per_modulation
            .iter()
            .copied()
            .min()
            .unwrap_or(0);

        Ok(Self {
            schedule_granularity: config.schedule_granularity,
            sync_period: config.sync_period,
            timer_frequency_hz: config.timer_frequency_hz,
            contention_header_length: header + config.contention_field_length as u64,
            data_header_length: header,
            max_data_payload,
            slot_schedule_header_length: header,
            slot_schedule_item_length: config.slot_schedule_item_length as u64,
            round_schedule_item_length: config.round_schedule_item_length as u64,
            round_schedule_item_count,
            round_schedule_length,
            mod_count,
            power_count: model.powers().len() as u64,
            sync_slot_times,
            contention_slot_times,
            slot_schedule_slot_times,
            round_schedule_slot_times,
            max_payload_per_modulation,
        })
    }
}
