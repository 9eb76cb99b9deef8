use anyhow::{Context, Result};
use serde::Serialize;

/// One row of `cleaned_listings.csv`.
#[derive(Debug, Serialize)]
struct SampleListing {
    id: u32,
    name: String,
    host_is_superhost: bool,
    neighbourhood_cleansed: &'static str,
    room_type: &'static str,
    price: f64,
    availability_365: u16,
    review_score_avg: Option<f64>,
    reviews_per_month: Option<f64>,
    cancellation_policy: &'static str,
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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (neighbourhood, price multiplier)
const NEIGHBOURHOODS: [(&str, f64); 8] = [
    ("Belltown", 1.4),
    ("Capitol Hill", 1.2),
    ("Queen Anne", 1.25),
    ("Fremont", 1.0),
    ("Ballard", 0.95),
    ("Wallingford", 0.9),
    ("University District", 0.75),
    ("Rainier Valley", 0.65),
];

/// (room type, base nightly price)
const ROOM_TYPES: [(&str, f64); 3] = [
    ("Entire home/apt", 160.0),
    ("Private room", 75.0),
    ("Shared room", 45.0),
];

const POLICIES: [&str; 3] = ["flexible", "moderate", "strict"];
const ADJECTIVES: [&str; 6] = ["Cozy", "Sunny", "Modern", "Charming", "Quiet", "Spacious"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "cleaned_listings.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let n = 1500;
    for id in 0..n {
        let &(neighbourhood, multiplier) = rng.pick(&NEIGHBOURHOODS);
        let &(room_type, base) = rng.pick(&ROOM_TYPES);
        let price = (base * multiplier * rng.gauss(1.0, 0.3).max(0.2)).round();

        // Roughly one in ten listings has never been reviewed.
        let reviewed = rng.next_f64() > 0.1;
        let review_score_avg = reviewed
            .then(|| (rng.gauss(4.7, 0.25).clamp(1.0, 5.0) * 100.0).round() / 100.0);
        let reviews_per_month =
            reviewed.then(|| (rng.gauss(2.0, 1.2).max(0.05) * 100.0).round() / 100.0);

        writer.serialize(SampleListing {
            id,
            name: format!(
                "{} {} in {neighbourhood}",
                rng.pick(&ADJECTIVES),
                room_type.to_lowercase()
            ),
            host_is_superhost: rng.next_f64() < 0.25,
            neighbourhood_cleansed: neighbourhood,
            room_type,
            price,
            availability_365: (rng.next_u64() % 366) as u16,
            review_score_avg,
            reviews_per_month,
            cancellation_policy: *rng.pick(&POLICIES),
        })?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {n} listings to {output_path}");
    Ok(())
}
