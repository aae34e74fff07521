use clap::{Parser, Subcommand};
use imodkit::config::{ExportOptions, TransformMode};
use imodkit::export::export_vrml_file;
use imodkit::metrics::{self, ELLIPSE_COLUMN_NAMES, STATS_COLUMN_NAMES};
use imodkit::{model_file, Model};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "imodkit", about = "Inspect, rewrite and export IMOD model files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show model header fields and a per-object summary
    Info {
        input: PathBuf,
    },
    /// Decode a model and check that it would encode cleanly
    Verify {
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// Decode and re-encode a model
    Convert {
        input:  PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write one object's mesh as a VRML 2.0 scene
    Export {
        input:     PathBuf,
        /// 1-based object number
        #[arg(short = 'n', long)]
        object:    Option<usize>,
        #[arg(short, long)]
        output:    Option<PathBuf>,
        /// Transform handling: auto (default), required, ignore
        #[arg(short, long)]
        transform: Option<String>,
        #[arg(long)]
        crease_angle: Option<f32>,
        /// JSON file with export options; flags override its values
        #[arg(short, long)]
        config:    Option<PathBuf>,
    },
    /// Per-contour ellipse fit via imodinfo
    Ellipse {
        input:  PathBuf,
        #[arg(short = 'n', long)]
        object: usize,
    },
    /// Per-contour statistics and mesh totals via imodinfo
    Stats {
        input:  PathBuf,
        #[arg(short = 'n', long)]
        object: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    match Cli::parse().command {

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let model = model_file::open(&input)?;
            let h = &model.header;
            println!("── IMOD model ───────────────────────────────────────────");
            println!("  Path           {}", input.display());
            println!("  Version        {}", model.version);
            println!("  Name           {}", h.name);
            println!("  Extents        {} x {} x {}", h.max[0], h.max[1], h.max[2]);
            println!("  Pixel size     {} (units {})", h.pixel_size, h.units);
            println!("  Scale          {:?}", h.scale);
            println!("  Transform      {}", if model.transform.is_some() { "MINX" } else { "none" });
            println!("  Extensions     {}", describe_extensions(&model.extensions));
            println!("  Objects        {}", model.object_count());
            println!("{:>4}  {:<28} {:>9} {:>7} {:>10} {:>10}",
                     "#", "Name", "Contours", "Meshes", "Points", "Vertices");
            for (i, obj) in model.objects.iter().enumerate() {
                let points: usize = obj.contours.iter().map(|c| c.point_count()).sum();
                let vertices: usize = obj.meshes.iter().map(|m| m.vertex_count()).sum();
                println!("{:>4}  {:<28} {:>9} {:>7} {:>10} {:>10}",
                    i + 1, obj.name, obj.contours.len(), obj.meshes.len(), points, vertices);
                if !obj.extensions.is_empty() {
                    println!("{:>6}extensions: {}", "", describe_extensions(&obj.extensions));
                }
            }
        }

        // ── Verify ───────────────────────────────────────────────────────────
        Commands::Verify { input } => {
            let results = model_file::open_many(&input);
            let mut failed = 0;
            for (path, result) in input.iter().zip(results) {
                match result.and_then(|model| verify(&model)) {
                    Ok(size) => println!("  ok      {}  ({size} B re-encoded)", path.display()),
                    Err(e) => {
                        failed += 1;
                        println!("  FAILED  {}  {e}", path.display());
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{failed} of {} file(s) failed verification", input.len()).into());
            }
        }

        // ── Convert ──────────────────────────────────────────────────────────
        Commands::Convert { input, output } => {
            let model = model_file::open(&input)?;
            let written = model_file::save(&output, &model)?;
            println!("Wrote {} ({written} B)", output.display());
        }

        // ── Export ───────────────────────────────────────────────────────────
        Commands::Export { input, object, output, transform, crease_angle, config } => {
            let mut opts = match config {
                Some(path) => ExportOptions::from_json_file(path)?,
                None       => ExportOptions::default(),
            };
            if let Some(n) = object { opts.object = n; }
            if let Some(p) = output { opts.output = p; }
            if let Some(t) = transform { opts.transform = parse_transform(&t)?; }
            if let Some(a) = crease_angle { opts.crease_angle = a; }

            let model = model_file::open(&input)?;
            export_vrml_file(&model, &opts)?;
            println!("Exported object {} → {}", opts.object, opts.output.display());
        }

        // ── Ellipse ──────────────────────────────────────────────────────────
        Commands::Ellipse { input, object } => {
            let (index, expected) = contour_count(&input, object)?;
            let table = metrics::fetch_contour_metrics(&input, index, expected)?;
            print_rows("contour", &ELLIPSE_COLUMN_NAMES, table.rows.iter().map(|r| &r[..]));
        }

        // ── Stats ────────────────────────────────────────────────────────────
        Commands::Stats { input, object } => {
            let (index, expected) = contour_count(&input, object)?;
            let report = metrics::fetch_contour_stats(&input, index, expected)?;
            print_rows("contour", &STATS_COLUMN_NAMES, report.rows.iter().map(|r| &r[..]));
            if let Some(v) = report.volume { println!("Volume        {v} µm³"); }
            if let Some(a) = report.surface_area { println!("Surface area  {a} µm²"); }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn verify(model: &Model) -> imodkit::error::Result<u64> {
    imodkit::encode(model, std::io::sink())
}

/// 0-based index and contour count of a 1-based object number.
fn contour_count(path: &Path, number: usize) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let model = model_file::open(path)?;
    let object = model.object_by_number(number)?;
    Ok((number - 1, object.contours.len()))
}

fn describe_extensions(exts: &[imodkit::Extension]) -> String {
    if exts.is_empty() {
        return "none".into();
    }
    exts.iter()
        .map(|e| format!("{} ({} B)", e.tag, e.payload.len()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_transform(s: &str) -> Result<TransformMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "auto"     => Ok(TransformMode::Auto),
        "required" => Ok(TransformMode::Required),
        "ignore"   => Ok(TransformMode::Ignore),
        other      => Err(format!("Unknown transform mode '{other}' (auto, required, ignore)")),
    }
}

fn print_rows<'a>(key: &str, columns: &[&str], rows: impl Iterator<Item = &'a [f64]>) {
    print!("{key:>8}");
    for name in columns {
        print!(" {name:>13}");
    }
    println!();
    for (i, row) in rows.enumerate() {
        print!("{:>8}", i + 1);
        for v in row {
            print!(" {v:>13.4}");
        }
        println!();
    }
}
