use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use rusty_norm::data::fits::{write_bintable, write_image_1d, HeaderValue};
use rusty_norm::data::text::write_two_columns;

/// Write a synthetic absorption-line spectrum in every format rusty-norm reads.
#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Directory receiving sample_spectrum.txt, sample_spectrum.fits and sample_table.fits.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Seed of the noise generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const START: f64 = 5000.0;
const STEP: f64 = 0.05;
const SAMPLES: usize = 4000;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Slowly varying blaze-like continuum.
fn continuum(w: f64) -> f64 {
    let t = (w - START) / (STEP * SAMPLES as f64);
    1200.0 + 300.0 * t - 400.0 * (t - 0.5).powi(2) + 40.0 * (6.0 * t).sin()
}

fn generate_spectrum(
    wavelengths: &[f64],
    lines: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    wavelengths
        .iter()
        .map(|&w| {
            let depth: f64 = lines
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(w, mu, sigma, amp))
                .sum();
            let c = continuum(w);
            c * (1.0 - depth.min(0.95)) + rng.gauss(0.0, noise_level * c)
        })
        .collect()
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

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let wavelengths: Vec<f64> = (0..SAMPLES).map(|i| START + i as f64 * STEP).collect();

    // (center, sigma, depth)
    let lines = [
        (5020.0, 0.40, 0.60),
        (5048.5, 0.15, 0.35),
        (5071.2, 0.80, 0.80),
        (5102.0, 0.25, 0.50),
        (5133.7, 0.10, 0.25),
        (5160.4, 0.35, 0.70),
        (5181.0, 1.20, 0.45),
    ];
    let flux = generate_spectrum(&wavelengths, &lines, 0.01, &mut rng);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let txt = args.out_dir.join("sample_spectrum.txt");
    write_two_columns(&txt, &wavelengths, &flux)
        .with_context(|| format!("Failed to write {}", txt.display()))?;

    let image = args.out_dir.join("sample_spectrum.fits");
    let cards = [
        ("CRVAL1", HeaderValue::Real(START)),
        ("CDELT1", HeaderValue::Real(STEP)),
        ("CRPIX1", HeaderValue::Real(1.0)),
        ("CTYPE1", HeaderValue::Text("WAVE".into())),
        ("OBJECT", HeaderValue::Text("SYNTHETIC".into())),
    ];
    write_image_1d(&image, &flux, &cards)
        .with_context(|| format!("Failed to write {}", image.display()))?;

    let table = args.out_dir.join("sample_table.fits");
    write_bintable(&table, &[("WAVE", wavelengths.as_slice()), ("FLUX", flux.as_slice())])
        .with_context(|| format!("Failed to write {}", table.display()))?;

    println!(
        "Wrote {} samples ({} absorption lines) to {}, {} and {}",
        wavelengths.len(),
        lines.len(),
        txt.display(),
        image.display(),
        table.display()
    );
    Ok(())
}
