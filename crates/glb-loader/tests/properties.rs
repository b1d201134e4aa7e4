//! Property tests for the container reader and accessor resolver.

mod common;

use common::{GlbBuilder, FLOAT};
use glb_loader::container::GLB_MAGIC;
use glb_loader::{parse_glb, resolve_accessor};
use proptest::prelude::*;

proptest! {
    #[test]
    fn any_other_magic_is_malformed(magic in any::<u32>().prop_filter("not glTF", |m| *m != GLB_MAGIC)) {
        let mut data = GlbBuilder::new().build();
        data[0..4].copy_from_slice(&magic.to_le_bytes());
        let err = parse_glb(&data).unwrap_err();
        prop_assert!(err.is_malformed());
    }

    #[test]
    fn random_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = parse_glb(&data);
    }

    #[test]
    fn vec3_accessor_resolves_to_3n_values(
        values in proptest::collection::vec(prop::array::uniform3(-1.0e6f32..1.0e6), 1..21)
            .prop_map(|v| v.concat())
    ) {
        let mut builder = GlbBuilder::new();
        let view = builder.push_floats(&values);
        let accessor = builder.accessor(view, 0, FLOAT, values.len() / 3, "VEC3");
        let data = builder.build();

        let asset = parse_glb(&data).unwrap();
        let first = resolve_accessor(&asset.document, asset.binary, accessor).unwrap();
        let second = resolve_accessor(&asset.document, asset.binary, accessor).unwrap();

        let first: Vec<f32> = first.iter_f32().collect();
        let second: Vec<f32> = second.iter_f32().collect();
        prop_assert_eq!(first.len(), values.len());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &values);
    }
}
