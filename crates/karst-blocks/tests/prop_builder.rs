use karst_blocks::WorldBuilder;
use karst_blocks::state::{describe_state_index, state_index_from_values};
use proptest::prelude::*;

proptest! {
    // Any insertion sequence of distinct properties ends up sorted by
    // byte-wise name order, with the state count tracking the product of
    // value counts.
    #[test]
    fn add_property_keeps_names_sorted(
        names in prop::collection::hash_set("[a-z]{1,8}", 1..8usize)
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut builder = WorldBuilder::new();
        for name in &names {
            builder.props.register_bool(name, name).unwrap();
        }
        let index = builder.begin_block("karst:subject").unwrap();
        for name in &names {
            let id = builder.props.id_by_key(name).unwrap();
            builder.blocks[index]
                .add_property(&builder.props, id, "false")
                .unwrap();
        }

        let schema_names: Vec<&str> = builder.blocks[index]
            .schema()
            .iter()
            .map(|e| builder.props.get(e.property).name())
            .collect();
        let mut expected = schema_names.clone();
        expected.sort();
        prop_assert_eq!(&schema_names, &expected);
        prop_assert_eq!(builder.blocks[index].state_count(), 1usize << names.len());
    }

    // Mixed-radix decoding inverts encoding for arbitrary value domains.
    #[test]
    fn mixed_radix_round_trip(
        value_counts in prop::collection::vec(2usize..6, 1..5usize)
    ) {
        let mut builder = WorldBuilder::new();
        for (i, &count) in value_counts.iter().enumerate() {
            let key = format!("p{i}");
            let values: Vec<String> = (0..count).map(|v| format!("v{v}")).collect();
            let value_refs: Vec<&str> = values.iter().map(String::as_str).collect();
            builder.props.register_enum(&key, &key, &value_refs).unwrap();
        }
        let index = builder.begin_block("karst:subject").unwrap();
        for i in 0..value_counts.len() {
            let id = builder.props.id_by_key(&format!("p{i}")).unwrap();
            builder.blocks[index]
                .add_property(&builder.props, id, "v0")
                .unwrap();
        }

        let config = &builder.blocks[index];
        let total: usize = value_counts.iter().product();
        prop_assert_eq!(config.state_count(), total);
        for state_index in 0..total {
            let info = describe_state_index(config.schema(), &builder.props, state_index);
            let values: Vec<usize> = info.entries().iter().map(|e| e.value_index).collect();
            prop_assert_eq!(
                state_index_from_values(config.schema(), &builder.props, &values),
                state_index
            );
        }
    }
}
