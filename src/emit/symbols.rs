//! Collection of every emitted constant into one [`ArtifactSet`].

use super::artifact::{ArraySymbol, ArtifactSet, Define, ElementType};
use super::format::{human_frequency, human_power, human_time};
use crate::gloria::GloriaModel;
use crate::lwb::{ProtocolConstants, SlotRow, SlotTimingTable, PAYLOAD_LENGTHS};

fn table_values(rows: &[SlotRow]) -> Vec<i64> {
    rows.iter()
        .flat_map(|row| row.iter().map(|&ticks| ticks as i64))
        .collect()
}

/// Collect defines and arrays in emission order.
pub fn collect(
    constants: &ProtocolConstants,
    model: &GloriaModel,
    table: &SlotTimingTable,
) -> ArtifactSet {
    let hz = constants.timer_frequency_hz;
    let bytes = |n: u64| format!("{} bytes", n);

    let defines = vec![
        Define::new("LWB_SCHEDULE_GRANULARITY", constants.schedule_granularity)
            .with_comment(human_time(constants.schedule_granularity, hz)),
        Define::new("LWB_SYNC_PERIOD", constants.sync_period)
            .with_comment(human_time(constants.sync_period, hz)),
        Define::new("LWB_TIMER_FREQUENCY", constants.timer_frequency_hz)
            .with_comment(human_frequency(hz)),
        Define::new("LWB_CONTENTION_HEADER_LENGTH", constants.contention_header_length)
            .with_comment(bytes(constants.contention_header_length)),
        Define::new("LWB_DATA_HEADER_LENGTH", constants.data_header_length)
            .with_comment(bytes(constants.data_header_length)),
        Define::new("LWB_MAX_DATA_PAYLOAD", constants.max_data_payload)
            .with_comment(bytes(constants.max_data_payload)),
        Define::new("LWB_SLOT_SCHEDULE_HEADER_LENGTH", constants.slot_schedule_header_length)
            .with_comment(bytes(constants.slot_schedule_header_length)),
        Define::new("LWB_SLOT_SCHEDULE_ITEM_LENGTH", constants.slot_schedule_item_length)
            .with_comment(bytes(constants.slot_schedule_item_length)),
        Define::new("LWB_ROUND_SCHEDULE_ITEM", constants.round_schedule_item_length)
            .with_comment(bytes(constants.round_schedule_item_length)),
        Define::new("LWB_ROUND_SCHEDULE_ITEM_COUNT", constants.round_schedule_item_count)
            .with_comment(format!(
                "{} per modulation",
                constants.round_schedule_item_count / constants.mod_count.max(1)
            )),
        Define::new("LWB_ROUND_SCHEDULE_LENGTH", constants.round_schedule_length)
            .with_comment(bytes(constants.round_schedule_length)),
        Define::new("LWB_MOD_COUNT", constants.mod_count),
        Define::new("LWB_POWER_COUNT", constants.power_count),
    ];

    let modulation_names: Vec<String> = model
        .modulations()
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    let with_names = |symbol: ArraySymbol| symbol.with_labels(modulation_names.clone());

    let slot_type = table.element_type();
    let fixed_slot = |name: &'static str, ticks: &[u64]| {
        let values: Vec<i64> = ticks.iter().map(|&t| t as i64).collect();
        let symbol = ArraySymbol::vector(name, slot_type, &values);
        let labels = model
            .modulations()
            .iter()
            .zip(ticks)
            .map(|(m, &t)| format!("{}: {}", m.name(), human_time(t, hz)))
            .collect();
        symbol.with_labels(labels)
    };

    let params = model.params();
    let power_levels: Vec<u8> = params.iter().map(|p| p.power_level).collect();
    let retransmissions: Vec<u8> = params.iter().map(|p| p.retransmissions).collect();
    let hops: Vec<u8> = params.iter().map(|p| p.hops).collect();
    let modulation_ids: Vec<u8> = model.modulations().iter().map(|m| m.index()).collect();

    let arrays = vec![
        with_names(ArraySymbol::vector(
            "gloria_default_power_levels",
            ElementType::U8,
            &power_levels,
        )),
        with_names(ArraySymbol::vector(
            "gloria_retransmission_counts",
            ElementType::U8,
            &retransmissions,
        )),
        with_names(ArraySymbol::vector("gloria_hop_counts", ElementType::U8, &hops)),
        with_names(ArraySymbol::vector(
            "lwb_modulations",
            ElementType::U8,
            &modulation_ids,
        )),
        ArraySymbol::vector("lwb_powers", ElementType::I8, model.powers())
            .with_labels(model.powers().iter().map(|&p| human_power(p)).collect()),
        with_names(ArraySymbol::vector(
            "lwb_slot_counts",
            ElementType::U8,
            model.slot_counts(),
        )),
        fixed_slot("lwb_sync_slot_times", &constants.sync_slot_times),
        fixed_slot("lwb_contention_slot_times", &constants.contention_slot_times),
        fixed_slot("lwb_slot_schedule_slot_times", &constants.slot_schedule_slot_times),
        fixed_slot("lwb_round_schedule_slot_times", &constants.round_schedule_slot_times),
        with_names(ArraySymbol::table(
            "lwb_slot_times",
            slot_type,
            PAYLOAD_LENGTHS,
            table_values(table.slot_times()),
        ))
        .with_note("indexed by modulation and payload length, in ticks"),
        with_names(ArraySymbol::table(
            "lwb_slot_acked_times",
            slot_type,
            PAYLOAD_LENGTHS,
            table_values(table.slot_acked_times()),
        ))
        .with_note("indexed by modulation and payload length, in ticks, acknowledgement included"),
    ];

    log::debug!(
        "Collected {} defines and {} arrays",
        defines.len(),
        arrays.len()
    );

    ArtifactSet { defines, arrays }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LwbConfig;
    use crate::radio::Sx1262Timing;

    fn default_set() -> ArtifactSet {
        let config = LwbConfig::default();
        let model = GloriaModel::new(&config).unwrap();
        let table = SlotTimingTable::build(&config, &model, &Sx1262Timing).unwrap();
        let constants = ProtocolConstants::derive(&config, &model, &table).unwrap();
        collect(&constants, &model, &table)
    }

    fn array<'a>(set: &'a ArtifactSet, name: &str) -> &'a ArraySymbol {
        set.arrays.iter().find(|a| a.name == name).unwrap()
    }

    fn define(set: &ArtifactSet, name: &str) -> u64 {
        set.defines.iter().find(|d| d.name == name).unwrap().value
    }

    #[test]
    fn test_collected_set_is_consistent() {
        assert_eq!(default_set().verify(), Ok(()));
    }

    #[test]
    fn test_all_symbols_present() {
        let set = default_set();
        assert_eq!(set.defines.len(), 13);
        assert_eq!(set.arrays.len(), 12);
        assert_eq!(define(&set, "LWB_MOD_COUNT"), 4);
        assert_eq!(define(&set, "LWB_POWER_COUNT"), 2);
        assert_eq!(define(&set, "LWB_CONTENTION_HEADER_LENGTH"), 12);
    }

    #[test]
    fn test_array_lengths_follow_counts() {
        let set = default_set();
        let mod_count = define(&set, "LWB_MOD_COUNT") as usize;
        for name in [
            "gloria_default_power_levels",
            "gloria_retransmission_counts",
            "gloria_hop_counts",
            "lwb_modulations",
            "lwb_slot_counts",
            "lwb_sync_slot_times",
            "lwb_contention_slot_times",
            "lwb_slot_schedule_slot_times",
            "lwb_round_schedule_slot_times",
        ] {
            assert_eq!(array(&set, name).values.len(), mod_count, "{}", name);
        }
        assert_eq!(
            array(&set, "lwb_powers").values.len(),
            define(&set, "LWB_POWER_COUNT") as usize
        );
        assert_eq!(array(&set, "lwb_slot_times").values.len(), mod_count * 256);
        assert_eq!(array(&set, "lwb_slot_acked_times").rows().len(), mod_count);
    }

    #[test]
    fn test_values_carried_over() {
        let set = default_set();
        assert_eq!(array(&set, "lwb_modulations").values, vec![3, 5, 7, 9]);
        assert_eq!(array(&set, "lwb_powers").values, vec![10, 22]);
        assert_eq!(array(&set, "lwb_powers").element_type, ElementType::I8);
        assert_eq!(array(&set, "gloria_hop_counts").values, vec![1, 2, 3, 3]);
        assert_eq!(array(&set, "lwb_slot_times").element_type, ElementType::U32);
    }

    #[test]
    fn test_modulation_labels() {
        let set = default_set();
        assert_eq!(
            array(&set, "lwb_modulations").labels,
            vec!["SF9", "SF7", "SF5", "FSK 200k"]
        );
    }
}
