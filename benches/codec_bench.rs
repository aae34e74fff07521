use criterion::{black_box, criterion_group, criterion_main, Criterion};
use imodkit::{decode, encode_to_vec, Contour, Mesh, Model, Object, Point};

fn dense_model() -> Model {
    let contours = (0..200)
        .map(|z| {
            let points = (0..256)
                .map(|i| {
                    let a = i as f32 / 256.0 * std::f32::consts::TAU;
                    Point::new(100.0 * a.cos(), 100.0 * a.sin(), z as f32)
                })
                .collect();
            Contour::new(points)
        })
        .collect();

    let vertices: Vec<f32> = (0..60_000).map(|i| (i % 997) as f32 * 0.25).collect();
    let mut indices = vec![-25, -23];
    indices.extend((0..29_997).map(|i| (i % 10_000) * 2));
    indices.extend([-22, -1]);

    Model {
        objects: vec![
            Object { contours, ..Object::new("membrane") },
            Object { meshes: vec![Mesh::new(vertices, indices)], ..Object::new("surface") },
        ],
        ..Model::new("bench")
    }
}

fn bench_encode(c: &mut Criterion) {
    let model = dense_model();
    c.bench_function("encode_dense_model", |b| {
        b.iter(|| encode_to_vec(black_box(&model)).unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = encode_to_vec(&dense_model()).unwrap();
    c.bench_function("decode_dense_model", |b| b.iter(|| decode(black_box(&bytes)).unwrap()));
}

fn bench_triangles(c: &mut Criterion) {
    let model = dense_model();
    let mesh = &model.objects[1].meshes[0];
    c.bench_function("mesh_triangles", |b| b.iter(|| black_box(mesh).triangles()));
}

criterion_group!(benches, bench_encode, bench_decode, bench_triangles);
criterion_main!(benches);
