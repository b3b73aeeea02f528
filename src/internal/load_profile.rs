#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::print_stdout)]

//! Inserts random keys into each table variant and charts how the load
//! factor and the share of empty buckets evolve.

use bucketmap::{ChainedMap, HashTable, OpenAddressingMap, hash_functions::std_hash};
use plotters::prelude::*;
use rand::Rng;

// Keys inserted per run
const NUM_KEYS: usize = 2_000;
// Initial bucket count for every table
const INITIAL_CAPACITY: usize = 64;
// Sample every this many insertions
const SAMPLE_EVERY: usize = 20;

/// One sampled point of a table's history
#[derive(Debug, Clone, Copy)]
struct Sample {
    inserted: usize,
    load: f64,
    empty_share: f64,
}

/// A labelled series of samples
#[derive(Debug)]
struct Run {
    name: &'static str,
    samples: Vec<Sample>,
}

// Puts every key and records load factor and empty-bucket share along the way
fn profile<T: HashTable<String, usize>>(name: &'static str, table: &mut T, keys: &[String]) -> Run {
    let mut samples = Vec::with_capacity(keys.len() / SAMPLE_EVERY + 1);
    for (i, key) in keys.iter().enumerate() {
        table.put(key.clone(), i);
        if i % SAMPLE_EVERY == 0 {
            samples.push(Sample {
                inserted: i + 1,
                load: table.table_load(),
                empty_share: table.empty_buckets() as f64 / table.capacity() as f64,
            });
        }
    }
    println!(
        "  {name}: size = {}, capacity = {}, load = {:.2}, empty buckets = {}",
        table.size(),
        table.capacity(),
        table.table_load(),
        table.empty_buckets()
    );
    Run { name, samples }
}

// Draws one metric of every run as a line chart
fn draw_chart(
    path: &str,
    caption: &str,
    y_desc: &str,
    runs: &[Run],
    metric: fn(&Sample) -> f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let colors = [RGBColor(220, 50, 50), RGBColor(50, 90, 220), RGBColor(50, 180, 50)];

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = runs
        .iter()
        .flat_map(|run| run.samples.iter().map(metric))
        .fold(0.0, f64::max) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..NUM_KEYS, 0.0..max_y.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Number of Keys Inserted")
        .y_desc(y_desc)
        .axis_desc_style((font_family, 16))
        .draw()?;

    for (run_idx, run) in runs.iter().enumerate() {
        let color = colors[run_idx % colors.len()];
        let line_style = ShapeStyle::from(&color).stroke_width(2);

        chart
            .draw_series(LineSeries::new(
                run.samples.iter().map(|sample| (sample.inserted, metric(sample))),
                line_style,
            ))?
            .label(run.name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::rng();
    let keys: Vec<String> =
        (0..NUM_KEYS).map(|_| format!("key-{}", rng.random_range(0..1_000_000_u32))).collect();

    println!("Inserting {NUM_KEYS} random keys into tables of {INITIAL_CAPACITY} buckets");

    let mut open: OpenAddressingMap<String, usize> =
        OpenAddressingMap::new(INITIAL_CAPACITY, std_hash::<str>);
    let mut fixed: ChainedMap<String, usize> = ChainedMap::new(INITIAL_CAPACITY, std_hash::<str>);
    let mut growing: ChainedMap<String, usize> =
        ChainedMap::new(INITIAL_CAPACITY, std_hash::<str>).with_max_load_factor(Some(1.0));

    let runs = [
        profile("Open addressing", &mut open, &keys),
        profile("Chaining (fixed)", &mut fixed, &keys),
        profile("Chaining (load limit 1.0)", &mut growing, &keys),
    ];
    println!(
        "  longest chain: fixed = {}, load limit 1.0 = {}",
        fixed.longest_chain(),
        growing.longest_chain()
    );

    draw_chart("table_load.png", "Load Factor per Insertion", "Load factor", &runs, |s| s.load)?;
    draw_chart(
        "empty_buckets.png",
        "Share of Empty Buckets per Insertion",
        "Empty buckets / capacity",
        &runs,
        |s| s.empty_share,
    )?;

    println!("Generated plot images: table_load.png, empty_buckets.png");

    Ok(())
}
