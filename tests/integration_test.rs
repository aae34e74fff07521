use imodkit::export::export_vrml_file;
use imodkit::tag::{MINX, OBJT};
use imodkit::{
    model_file, Contour, ContractError, ExportOptions, Extension, FormatError, ImodError, Mesh,
    Model, Object, Point, Tag, Transform,
};
use std::fs;
use tempfile::{tempdir, NamedTempFile};

fn sample_model() -> Model {
    let ring: Vec<Point> = (0..8)
        .map(|i| {
            let a = i as f32 * std::f32::consts::FRAC_PI_4;
            Point::new(10.0 * a.cos(), 10.0 * a.sin(), 4.0)
        })
        .collect();

    let mut vertices = Vec::new();
    for p in [[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [0.0, 4.0, 0.0]] {
        vertices.extend_from_slice(&p);
        vertices.extend_from_slice(&[0.0, 0.0, 1.0]);
    }
    let mesh = Mesh::new(vertices, vec![-25, -23, 0, 2, 4, -22, -1]);

    Model {
        objects: vec![
            Object {
                contours: vec![
                    Contour::new(ring.clone()),
                    Contour::new(ring).with_sizes(vec![1.5; 8]),
                ],
                ..Object::new("membrane")
            },
            Object {
                meshes: vec![mesh],
                extensions: vec![Extension::new(Tag(*b"CLIP"), vec![0, 1, 2, 3, 4, 5])],
                ..Object::new("vesicle")
            },
        ],
        transform: Some(Transform { scale: [1.0, 1.0, 2.5], ..Transform::default() }),
        extensions: vec![Extension::new(Tag(*b"VIEW"), vec![9; 12])],
        ..Model::new("tomogram")
    }
}

#[test]
fn test_save_and_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cell.mod");
    let model = sample_model();

    let written = model_file::save(&path, &model).unwrap();
    assert_eq!(written, fs::metadata(&path).unwrap().len());
    assert!(!dir.path().join("cell.mod.tmp").exists());

    let reopened = model_file::open(&path).unwrap();
    assert_eq!(reopened, model);
    assert_eq!(reopened.objects[0].contours[1].sizes.as_deref(), Some(&[1.5f32; 8][..]));
}

#[test]
fn test_file_starts_with_magic_and_ends_with_ieof() {
    let temp_file = NamedTempFile::new().unwrap();
    model_file::write(temp_file.path(), &sample_model()).unwrap();

    let bytes = fs::read(temp_file.path()).unwrap();
    assert_eq!(&bytes[..8], b"IMODV1.2");
    assert_eq!(&bytes[bytes.len() - 4..], b"IEOF");
    // first object immediately follows the 232-byte header
    assert_eq!(&bytes[240..244], OBJT.as_bytes());
}

#[test]
fn test_failed_save_keeps_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cell.mod");
    let model = sample_model();
    model_file::save(&path, &model).unwrap();
    let before = fs::read(&path).unwrap();

    let mut broken = model.clone();
    broken.objects[0].contours[0].sizes = Some(vec![1.0]);
    let err = model_file::save(&path, &broken).unwrap_err();
    assert!(matches!(
        err,
        ImodError::Contract(ContractError::SizeCountMismatch { object: 1, contour: 1, .. })
    ));

    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!dir.path().join("cell.mod.tmp").exists());
}

#[test]
fn test_open_many_keeps_order_and_isolates_failures() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.mod");
    let bad = dir.path().join("bad.mod");
    let missing = dir.path().join("missing.mod");

    model_file::save(&good, &sample_model()).unwrap();
    let mut bytes = fs::read(&good).unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&bad, &bytes).unwrap();

    let results = model_file::open_many(&[&good, &bad, &missing, &good]);
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ImodError::Format(FormatError::Truncated { .. }))));
    assert!(matches!(results[2], Err(ImodError::Io(_))));
    assert_eq!(results[3].as_ref().unwrap().object_count(), 2);
}

#[test]
fn test_export_to_file() {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("cell.mod");
    model_file::save(&model_path, &sample_model()).unwrap();

    let model = model_file::open(&model_path).unwrap();
    let opts = ExportOptions {
        output: dir.path().join("vesicle.wrl"),
        ..ExportOptions::for_object(2)
    };
    export_vrml_file(&model, &opts).unwrap();

    let scene = fs::read_to_string(&opts.output).unwrap();
    assert!(scene.starts_with("#VRML V2.0 utf8"));
    assert!(scene.contains("DEF obj2_vesicle Transform {"));
    // z scale follows x, so (0, 4, 0) stays as is
    assert!(scene.contains("            0 4 0,\n"));
    assert!(scene.contains("          2,1,0,-1,\n"));
}

#[test]
fn test_export_rejects_object_without_mesh() {
    let dir = tempdir().unwrap();
    let opts = ExportOptions {
        output: dir.path().join("membrane.wrl"),
        ..ExportOptions::for_object(1)
    };
    let err = export_vrml_file(&sample_model(), &opts).unwrap_err();
    assert!(matches!(err, ImodError::Contract(ContractError::MissingMesh { number: 1 })));
}

#[test]
fn test_model_transform_is_retained() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cell.mod");
    let mut model = sample_model();
    model.transform = None;
    model_file::save(&path, &model).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(!bytes.windows(4).any(|w| w == MINX.as_bytes()));
    assert_eq!(model_file::open(&path).unwrap().transform, None);
}
