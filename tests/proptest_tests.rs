//! Property-based tests for imodkit
//!
//! Random model trees are encoded and decoded to check that the codec keeps
//! every field, and random or damaged byte streams are decoded to check that
//! failures are reported as errors rather than panics.

use imodkit::header::MODEL_NAME_LEN;
use imodkit::object::OBJECT_NAME_LEN;
use imodkit::{
    decode, encode_to_vec, Contour, ContractError, Extension, FormatError, ImodError, Material,
    Mesh, Model, Object, Point, Tag, Transform,
};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

fn coord() -> impl Strategy<Value = f32> {
    prop_oneof![Just(0.0f32), prop::num::f32::NORMAL]
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Point::new(x, y, z))
}

fn contour_strategy() -> impl Strategy<Value = Contour> {
    prop::collection::vec(point_strategy(), 0..40).prop_flat_map(|points| {
        let n = points.len();
        (
            Just(points),
            any::<u32>(),
            any::<i32>(),
            any::<i32>(),
            prop::option::of(prop::collection::vec(coord(), n)),
        )
            .prop_map(|(points, flags, time, surface, sizes)| Contour {
                points,
                flags,
                time,
                surface,
                sizes,
            })
    })
}

fn mesh_strategy() -> impl Strategy<Value = Mesh> {
    (
        // whole (position, normal) pairs only
        prop::collection::vec(prop::array::uniform6(coord()), 0..12),
        prop::collection::vec(-30i32..200, 0..60),
        any::<u32>(),
        any::<u16>(),
        any::<u16>(),
    )
        .prop_map(|(pairs, indices, flags, time, surface)| Mesh {
            vertices: pairs.concat(),
            indices,
            flags,
            time,
            surface,
        })
}

fn extension_strategy(tags: &'static [&'static [u8; 4]]) -> impl Strategy<Value = Extension> {
    (prop::sample::select(tags), prop::collection::vec(any::<u8>(), 0..32))
        .prop_map(|(tag, payload)| Extension::new(Tag(*tag), payload))
}

fn transform_strategy() -> impl Strategy<Value = Transform> {
    prop::array::uniform3(coord()).prop_map(|scale| Transform { scale, ..Transform::default() })
}

fn name_strategy(charset: &str, max_len: usize) -> impl Strategy<Value = String> {
    proptest::string::string_regex(&format!("{charset}{{0,{max_len}}}")).unwrap()
}

fn object_strategy(max_name: usize) -> impl Strategy<Value = Object> {
    (
        name_strategy("[a-z0-9_é]", max_name),
        prop::collection::vec(contour_strategy(), 0..4),
        prop::collection::vec(mesh_strategy(), 0..3),
        prop::option::of((any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())),
        prop::option::of(transform_strategy()),
        0u8..=100,
        prop::collection::vec(extension_strategy(&[b"CLIP", b"MCLR", b"MEPA"]), 0..3),
    )
        .prop_map(|(name, contours, meshes, mat, transform, trans, extensions)| Object {
            contours,
            meshes,
            material: mat.map(|(a, d, s, sh)| Material::from_bytes(a, d, s, sh)),
            transform,
            transparency: f32::from(trans) / 100.0,
            extensions,
            ..Object::new(name)
        })
}

/// Names may be up to `max_name` bytes long (more for multi-byte chars).
fn model_strategy(max_name: usize) -> impl Strategy<Value = Model> {
    (
        name_strategy("[A-Za-z0-9 ._-]", max_name * 2),
        prop::collection::vec(object_strategy(max_name), 0..5),
        prop::option::of(transform_strategy()),
        // model-level tags only, so they cannot be taken for object chunks
        prop::collection::vec(extension_strategy(&[b"VIEW", b"MOST", b"SLAN"]), 0..3),
    )
        .prop_map(|(name, objects, transform, extensions)| Model {
            objects,
            transform,
            extensions,
            ..Model::new(name)
        })
}

// ============================================================================
// Properties
// ============================================================================

/// Models whose names all fit their fields.
fn encodable_model_strategy() -> impl Strategy<Value = Model> {
    model_strategy(OBJECT_NAME_LEN / 2)
}

fn names_fit(model: &Model) -> bool {
    model.header.name.len() <= MODEL_NAME_LEN
        && model.objects.iter().all(|o| o.name.len() <= OBJECT_NAME_LEN)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_model_round_trips(model in model_strategy(OBJECT_NAME_LEN + 16)) {
        if names_fit(&model) {
            let bytes = encode_to_vec(&model).unwrap();
            let decoded = decode(&bytes).unwrap();
            prop_assert_eq!(&decoded, &model);
            prop_assert_eq!(encode_to_vec(&decoded).unwrap(), bytes);
        } else {
            let refused = matches!(
                encode_to_vec(&model),
                Err(ImodError::Contract(ContractError::NameTooLong { .. }))
            );
            prop_assert!(refused);
        }
    }

    #[test]
    fn prop_every_strict_prefix_fails(model in encodable_model_strategy(), cut in any::<prop::sample::Index>()) {
        let bytes = encode_to_vec(&model).unwrap();
        let len = cut.index(bytes.len());
        let err = decode(&bytes[..len]).unwrap_err();
        prop_assert!(err.offset() <= len as u64);
    }

    #[test]
    fn prop_random_bytes_never_panic(body in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut bytes = b"IMODV1.2".to_vec();
        bytes.extend_from_slice(&body);
        let _ = decode(&bytes);
        let _ = decode(&body);
    }

    #[test]
    fn prop_unknown_object_chunk_is_kept(
        payload in prop::collection::vec(any::<u8>(), 0..64),
        points in prop::collection::vec(point_strategy(), 1..10),
    ) {
        let mut model = Model::new("skip");
        model.objects.push(Object {
            contours: vec![Contour::new(points)],
            extensions: vec![Extension::new(Tag(*b"ZZZZ"), payload.clone())],
            ..Object::new("carrier")
        });
        let decoded = decode(&encode_to_vec(&model).unwrap()).unwrap();
        prop_assert_eq!(decoded.objects[0].extensions.len(), 1);
        prop_assert_eq!(&decoded.objects[0].extensions[0].payload, &payload);
        prop_assert_eq!(&decoded.objects[0].contours, &model.objects[0].contours);
    }

    #[test]
    fn prop_object_count_is_checked(model in encodable_model_strategy(), extra in 1i32..4) {
        let mut bytes = encode_to_vec(&model).unwrap();
        // objsize follows the magic, version and 128-byte name plus 3 ints
        let at = 8 + 128 + 12;
        let declared = i32::from_be_bytes(bytes[at..at + 4].try_into().unwrap());
        prop_assert_eq!(declared as usize, model.objects.len());
        bytes[at..at + 4].copy_from_slice(&(declared + extra).to_be_bytes());
        let is_count_mismatch = matches!(decode(&bytes), Err(FormatError::CountMismatch { .. }));
        prop_assert!(is_count_mismatch);
    }
}
