//! VRML 2.0 scene export for a single object mesh.
//!
//! The exporter is a pure consumer of a decoded [`Model`]: it takes one
//! object's only mesh, the object's material and the transform in effect for
//! it, and writes an `IndexedFaceSet` scene.  It reads the mesh index stream
//! through [`Mesh::triangles`], so the "negative entry ends a run" and
//! "reference / 2 = vertex" conventions live in `mesh.rs`, not here.
//!
//! Coordinates are written as integers when whole and with one decimal
//! otherwise.  This is display formatting only; the model keeps full
//! precision.

use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::config::{ExportOptions, TransformMode};
use crate::error::{ContractError, Result};
use crate::extension::Transform;
use crate::mesh::Mesh;
use crate::model::Model;
use crate::object::Object;
use crate::tag::MINX;

/// Validate `opts`, then write the scene to `opts.output`.
pub fn export_vrml_file(model: &Model, opts: &ExportOptions) -> Result<()> {
    opts.validate()?;
    let mut out = BufWriter::new(File::create(&opts.output)?);
    export_vrml(model, opts, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Write the scene for object `opts.object` (1-based) to `out`.
pub fn export_vrml<W: Write>(model: &Model, opts: &ExportOptions, mut out: W) -> Result<()> {
    let number = opts.object;
    let object = model.object_by_number(number)?;
    let mesh = single_mesh(object, number)?;
    let transform = resolve_transform(model, number, opts.transform)?;
    let name = shape_name(number, &object.name);
    let material = object.material();

    debug!(
        "exporting object {number} as {name}: {} vertices, {} index entries",
        mesh.vertex_count(),
        mesh.indices.len()
    );

    writeln!(out, "#VRML V2.0 utf8")?;
    writeln!(out, "#Generated by imodkit\n")?;
    writeln!(out, "DEF imod_model Transform {{")?;
    writeln!(out, "  children [\n")?;
    writeln!(out, "#MATERIAL FOR OBJECT {number}:")?;
    writeln!(out, "Shape {{")?;
    writeln!(out, "  appearance DEF MAT_{name} Appearance {{")?;
    writeln!(out, "    material Material {{")?;
    writeln!(out, "      ambientIntensity {}", material.ambient)?;
    writeln!(out, "      diffuseColor {0} {0} {0}", material.diffuse)?;
    writeln!(out, "      specularColor {0} {0} {0}", material.specular)?;
    writeln!(out, "      emissiveColor 0 0 0")?;
    writeln!(out, "      shininess {}", material.shininess)?;
    writeln!(out, "      transparency {}", object.transparency)?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}\n")?;
    writeln!(out, "#DATA FOR OBJECT {number}:")?;
    writeln!(out, "DEF {name} Transform {{")?;
    writeln!(out, "  children [")?;
    writeln!(out, "    Shape {{   #MESH")?;
    writeln!(out, "      appearance USE MAT_{name}")?;
    writeln!(out, "      geometry DEF {name} IndexedFaceSet {{")?;
    writeln!(out, "        ccw FALSE")?;
    writeln!(out, "        solid FALSE")?;
    writeln!(out, "        creaseAngle {}", opts.crease_angle)?;
    writeln!(out, "        coord Coordinate {{")?;
    writeln!(out, "          point [   # list of all points in mesh")?;

    let [sx, sy, _] = transform.scale.map(f64::from);
    let [tx, ty, tz] = transform.translation.map(f64::from);
    for [x, y, z] in mesh.positions() {
        // Z uses the X scale so the exported mesh is isotropic.
        let x = f64::from(x) * sx + tx;
        let y = f64::from(y) * sy + ty;
        let z = f64::from(z) * sx + tz;
        writeln!(out, "            {} {} {},", format_coord(x), format_coord(y), format_coord(z))?;
    }
    writeln!(out, "          ]")?;
    writeln!(out, "        }}")?;

    writeln!(out, "        coordIndex [   # connect triangles")?;
    for [a, b, c] in mesh.triangles() {
        writeln!(out, "          {c},{b},{a},-1,")?;
    }
    writeln!(out, "        ]")?;
    writeln!(out, "      }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "  ]")?;
    writeln!(out, "}}\n")?;
    writeln!(out, "  ]")?;
    writeln!(out, "}}")?;
    Ok(())
}

fn single_mesh(object: &Object, number: usize) -> std::result::Result<&Mesh, ContractError> {
    match object.meshes.as_slice() {
        [mesh] => Ok(mesh),
        [] => Err(ContractError::MissingMesh { number }),
        many => Err(ContractError::MultipleMeshes { number, meshes: many.len() }),
    }
}

fn resolve_transform(
    model:  &Model,
    number: usize,
    mode:   TransformMode,
) -> std::result::Result<Transform, ContractError> {
    let found = model.effective_transform(number - 1);
    match mode {
        TransformMode::Auto     => Ok(found.unwrap_or_default()),
        TransformMode::Required => found.ok_or(ContractError::MissingExtension { tag: MINX }),
        TransformMode::Ignore   => Ok(Transform::default()),
    }
}

/// `obj<number>` followed by `_<word>` for each whitespace-separated word of
/// the object name.
pub fn shape_name(number: usize, object_name: &str) -> String {
    let mut name = format!("obj{number}");
    for word in object_name.split_whitespace() {
        name.push('_');
        name.push_str(word);
    }
    name
}

/// Whole values print as integers, everything else with one decimal.
pub fn format_coord(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v:.1}")
    }
}
