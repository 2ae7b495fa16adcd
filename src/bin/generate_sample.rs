use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// One analyte: D1 retention/width in minutes, D2 retention/width in seconds.
struct Compound {
    d1_rt: f64,
    d1_sigma: f64,
    d2_rt: f64,
    d2_sigma: f64,
    amplitude: f64,
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // 5 Hz detector, 40 min run. The instrument's true modulation period is
    // slightly longer than the nominal 0.5 min the operator will type in.
    let rate_hz = 5.0;
    let delta = 1.0 / (60.0 * rate_hz);
    let run_min = 40.0;
    let true_period = 0.5012;
    let n_samples = (run_min / delta) as usize + 1;

    let compounds = [
        Compound { d1_rt: 6.0, d1_sigma: 0.6, d2_rt: 8.0, d2_sigma: 0.8, amplitude: 120.0 },
        Compound { d1_rt: 11.5, d1_sigma: 0.8, d2_rt: 14.0, d2_sigma: 1.0, amplitude: 80.0 },
        Compound { d1_rt: 12.0, d1_sigma: 0.7, d2_rt: 21.0, d2_sigma: 0.9, amplitude: 60.0 },
        Compound { d1_rt: 19.0, d1_sigma: 1.0, d2_rt: 11.0, d2_sigma: 1.2, amplitude: 150.0 },
        Compound { d1_rt: 26.5, d1_sigma: 0.9, d2_rt: 25.0, d2_sigma: 0.7, amplitude: 90.0 },
        Compound { d1_rt: 31.0, d1_sigma: 1.2, d2_rt: 17.5, d2_sigma: 1.1, amplitude: 70.0 },
    ];

    let mut time = Vec::with_capacity(n_samples);
    let mut intensity = Vec::with_capacity(n_samples);

    for i in 0..n_samples {
        let t = i as f64 * delta;
        let cycle = (t / true_period).floor();
        let tau = (t - cycle * true_period) * 60.0;

        // Dead-volume bump and gradient ramp repeat in every D2 cycle.
        let baseline = gaussian(tau, 1.5, 0.4, 25.0) + 0.15 * tau;
        let signal: f64 = compounds
            .iter()
            .map(|c| {
                gaussian(t, c.d1_rt, c.d1_sigma, c.amplitude)
                    * gaussian(tau, c.d2_rt, c.d2_sigma, 1.0)
            })
            .sum();

        time.push(t);
        intensity.push(baseline + signal + rng.gauss(0.0, 0.4));
    }

    // Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("time", DataType::Float64, false),
        Field::new("intensity", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(time.clone())),
            Arc::new(Float64Array::from(intensity.clone())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_2dlc.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // CSV with a header line
    let csv_path = "sample_2dlc.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    csv_writer
        .write_record(["Time", "Intensity"])
        .expect("Failed to write CSV header");
    for (t, y) in time.iter().zip(&intensity) {
        csv_writer
            .write_record([format!("{t:.6}"), format!("{y:.4}")])
            .expect("Failed to write CSV row");
    }
    csv_writer.flush().expect("Failed to flush CSV");

    println!(
        "Wrote {n_samples} samples ({run_min} min at {rate_hz} Hz, true modulation {true_period} min) \
         to {parquet_path} and {csv_path}"
    );
}
