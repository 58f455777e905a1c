// Property tests: arbitrary input never panics and never shrinks; valid
// aggregates always expand to exactly their sub-records.

mod common;

use bytes::Bytes;
use proptest::prelude::*;

use deagg_core::aggregated::SubRecord;
use deagg_core::constants::AGG_MAGIC;
use deagg_core::deagg::{deaggregate_records, DeaggConfig, Deaggregator, IndexErrorPolicy};

use common::*;

type SubSpec = (usize, Option<usize>, Vec<u8>);

fn arb_aggregate() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<SubSpec>)> {
    (
        prop::collection::vec("[a-z0-9]{1,12}", 1..8),
        prop::collection::vec("[0-9]{1,39}", 0..4),
    )
        .prop_flat_map(|(pks, ehks)| {
            let pk_len = pks.len();
            let ehk_len = ehks.len();
            let sub = (
                0..pk_len,
                if ehk_len == 0 {
                    Just(None).boxed()
                } else {
                    prop::option::of(0..ehk_len).boxed()
                },
                prop::collection::vec(any::<u8>(), 0..64),
            );
            (Just(pks), Just(ehks), prop::collection::vec(sub, 1..20))
        })
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_shrink(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let payload = Bytes::from(data);
        let out = deaggregate_records(&[physical(payload.clone())]).unwrap();
        prop_assert_eq!(out.len(), 1);
        prop_assert_eq!(&out[0].data, &payload);
        prop_assert!(!out[0].aggregated);
    }

    #[test]
    fn arbitrary_bytes_behind_magic_never_panic(
        tail in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        let mut payload = AGG_MAGIC.to_vec();
        payload.extend_from_slice(&tail);

        // Digest off: garbage reaches the protobuf decoder.
        let deagg = Deaggregator::new(
            DeaggConfig::default()
                .with_verify_digest(false)
                .with_index_policy(IndexErrorPolicy::Skip),
        );
        let batch = deagg.deaggregate_batch(&[physical(payload)]).unwrap();
        prop_assert!(batch.telemetry.sanity_check());
    }

    #[test]
    fn valid_aggregates_expand_exactly((pks, ehks, subs) in arb_aggregate()) {
        let records: Vec<SubRecord> = subs
            .iter()
            .map(|(pk, ehk, data)| match ehk {
                Some(e) => sub_record_with_ehk(*pk as u64, *e as u64, data),
                None => sub_record(*pk as u64, data),
            })
            .collect();
        let pk_refs: Vec<&str> = pks.iter().map(String::as_str).collect();
        let ehk_refs: Vec<&str> = ehks.iter().map(String::as_str).collect();
        let payload = encode_aggregate(&aggregate(&pk_refs, &ehk_refs, records));

        let out = deaggregate_records(&[physical(payload)]).unwrap();
        prop_assert_eq!(out.len(), subs.len());

        for (i, (r, (pk, ehk, data))) in out.iter().zip(subs.iter()).enumerate() {
            prop_assert_eq!(r.sub_sequence_number, i as u64);
            prop_assert_eq!(&r.partition_key, &pks[*pk]);
            prop_assert_eq!(r.explicit_hash_key.as_ref(), ehk.map(|e| &ehks[e]));
            prop_assert_eq!(&r.data[..], &data[..]);
            prop_assert!(r.aggregated);
        }
    }

    #[test]
    fn single_byte_mutation_falls_back(
        (pks, ehks, subs) in arb_aggregate(),
        pos in any::<prop::sample::Index>()
    ) {
        let records: Vec<SubRecord> = subs
            .iter()
            .map(|(pk, _, data)| sub_record(*pk as u64, data))
            .collect();
        let pk_refs: Vec<&str> = pks.iter().map(String::as_str).collect();
        let ehk_refs: Vec<&str> = ehks.iter().map(String::as_str).collect();
        let mut payload = encode_aggregate(&aggregate(&pk_refs, &ehk_refs, records));

        let body_len = payload.len() - AGG_MAGIC.len() - 16;
        let i = AGG_MAGIC.len() + pos.index(body_len);
        payload[i] ^= 0x01;

        let out = deaggregate_records(&[physical(payload.clone())]).unwrap();
        prop_assert_eq!(out.len(), 1);
        prop_assert_eq!(&out[0].data[..], &payload[..]);
    }
}
