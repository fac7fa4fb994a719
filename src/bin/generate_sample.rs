use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Map, Value as JsonValue};

const CANDIDATES: usize = 120;
const DISPOSITIONS: [&str; 5] = ["PC", "KP", "CP", "APC", "FP"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Log-uniform draw, for quantities spanning orders of magnitude.
    fn log_uniform(&mut self, lo: f64, hi: f64) -> f64 {
        self.uniform(lo.ln(), hi.ln()).exp()
    }

    /// A measurement that is occasionally missing (null) or recorded as 0.
    fn measured(&mut self, value: f64) -> Option<f64> {
        let roll = self.next_f64();
        if roll < 0.04 {
            None
        } else if roll < 0.07 {
            Some(0.0)
        } else {
            Some(value)
        }
    }
}

/// Column-oriented synthetic TOI catalog.
struct SampleCatalog {
    tid: Vec<i64>,
    toi: Vec<String>,
    tfopwg_disp: Vec<String>,
    pl_orbper: Vec<Option<f64>>,
    pl_tranmid: Vec<Option<f64>>,
    pl_trandur: Vec<Option<f64>>,
    pl_trandep: Vec<Option<f64>>,
    pl_temp: Vec<Option<f64>>,
    st_dist: Vec<Option<f64>>,
}

fn generate(rng: &mut SimpleRng, n: usize) -> SampleCatalog {
    let mut catalog = SampleCatalog {
        tid: Vec::with_capacity(n),
        toi: Vec::with_capacity(n),
        tfopwg_disp: Vec::with_capacity(n),
        pl_orbper: Vec::with_capacity(n),
        pl_tranmid: Vec::with_capacity(n),
        pl_trandur: Vec::with_capacity(n),
        pl_trandep: Vec::with_capacity(n),
        pl_temp: Vec::with_capacity(n),
        st_dist: Vec::with_capacity(n),
    };

    for i in 0..n {
        let period = rng.log_uniform(0.5, 60.0);
        // TESS baseline: mid-2018 onward
        let tranmid = rng.uniform(2_458_325.0, 2_460_500.0);
        // hotter planets sit on shorter orbits
        let temp = 1_800.0 * period.powf(-1.0 / 3.0) + rng.uniform(-120.0, 120.0);
        // duration in hours, loosely scaling with the cube root of the period
        let duration = (1.4 * period.cbrt() * rng.uniform(0.7, 1.3) * 100.0).round() / 100.0;
        let depth = rng.log_uniform(200.0, 20_000.0).round();
        let distance = rng.log_uniform(10.0, 900.0);
        let disposition = DISPOSITIONS[(rng.next_u64() % DISPOSITIONS.len() as u64) as usize];

        catalog.tid.push(100_000_000 + (rng.next_u64() % 400_000_000) as i64);
        catalog.toi.push(format!("{}.01", 100 + i));
        catalog.tfopwg_disp.push(disposition.to_string());
        catalog.pl_orbper.push(rng.measured(period));
        catalog.pl_tranmid.push(rng.measured(tranmid));
        catalog.pl_trandur.push(rng.measured(duration));
        catalog.pl_trandep.push(rng.measured(depth));
        catalog.pl_temp.push(rng.measured(temp.round()));
        catalog.st_dist.push(rng.measured(distance));
    }
    catalog
}

fn write_parquet(catalog: &SampleCatalog, path: &str) -> Result<RecordBatch> {
    let float_field = |name: &str| Field::new(name, DataType::Float64, true);
    let schema = Arc::new(Schema::new(vec![
        Field::new("tid", DataType::Int64, false),
        Field::new("toi", DataType::Utf8, false),
        Field::new("tfopwg_disp", DataType::Utf8, false),
        float_field("pl_orbper"),
        float_field("pl_tranmid"),
        float_field("pl_trandur"),
        float_field("pl_trandep"),
        float_field("pl_temp"),
        float_field("st_dist"),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(catalog.tid.clone())),
        Arc::new(StringArray::from(catalog.toi.clone())),
        Arc::new(StringArray::from(catalog.tfopwg_disp.clone())),
        Arc::new(Float64Array::from(catalog.pl_orbper.clone())),
        Arc::new(Float64Array::from(catalog.pl_tranmid.clone())),
        Arc::new(Float64Array::from(catalog.pl_trandur.clone())),
        Arc::new(Float64Array::from(catalog.pl_trandep.clone())),
        Arc::new(Float64Array::from(catalog.pl_temp.clone())),
        Arc::new(Float64Array::from(catalog.st_dist.clone())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(batch)
}

/// Same catalog in the column-oriented JSON shape the catalog service returns.
fn write_json(catalog: &SampleCatalog, path: &str) -> Result<()> {
    let mut payload = Map::new();
    payload.insert("tid".into(), json!(catalog.tid));
    payload.insert("toi".into(), json!(catalog.toi));
    payload.insert("tfopwg_disp".into(), json!(catalog.tfopwg_disp));
    for (name, values) in [
        ("pl_orbper", &catalog.pl_orbper),
        ("pl_tranmid", &catalog.pl_tranmid),
        ("pl_trandur", &catalog.pl_trandur),
        ("pl_trandep", &catalog.pl_trandep),
        ("pl_temp", &catalog.pl_temp),
        ("st_dist", &catalog.st_dist),
    ] {
        payload.insert(name.into(), json!(values));
    }

    let text = serde_json::to_string_pretty(&JsonValue::Object(payload))?;
    std::fs::write(path, text).with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let catalog = generate(&mut rng, CANDIDATES);

    let batch = write_parquet(&catalog, "sample_toi.parquet")?;
    write_json(&catalog, "sample_toi.json")?;
    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);

    let complete = (0..CANDIDATES)
        .filter(|&i| {
            [
                catalog.pl_orbper[i],
                catalog.pl_tranmid[i],
                catalog.pl_trandur[i],
                catalog.pl_trandep[i],
                catalog.pl_temp[i],
                catalog.st_dist[i],
            ]
            .iter()
            .all(|v| matches!(v, Some(x) if *x != 0.0))
        })
        .count();

    println!(
        "Wrote {CANDIDATES} candidates ({complete} fully measured) \
         to sample_toi.parquet and sample_toi.json"
    );
    Ok(())
}
