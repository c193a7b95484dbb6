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

// The 60-noun catalog, five nouns per category. Catalog order fixes
// each noun's trial number.
const CATALOG: &[(&str, [&str; 5])] = &[
    ("animals", ["bear", "cat", "cow", "dog", "horse"]),
    ("bodyParts", ["arm", "eye", "foot", "hand", "leg"]),
    ("buildings", ["apartment", "barn", "church", "house", "igloo"]),
    ("buildingParts", ["arch", "chimney", "closet", "door", "window"]),
    ("clothing", ["coat", "dress", "pants", "shirt", "skirt"]),
    ("furniture", ["bed", "chair", "desk", "dresser", "table"]),
    ("insects", ["ant", "bee", "beetle", "butterfly", "fly"]),
    ("kitchenUtensils", ["bottle", "cup", "glass", "knife", "spoon"]),
    ("manMadeObjects", ["bell", "key", "refrigerator", "telephone", "watch"]),
    ("tools", ["chisel", "hammer", "pliers", "saw", "screwdriver"]),
    ("vegetables", ["carrot", "celery", "corn", "lettuce", "tomato"]),
    ("vehicles", ["airplane", "bicycle", "car", "train", "truck"]),
];

/// Typical truth for "is this alive?" per category, on a 0..1 scale.
fn living_base(category: &str) -> f64 {
    match category {
        "animals" | "insects" | "vegetables" | "bodyParts" => 0.92,
        _ => 0.08,
    }
}

fn manmade_base(category: &str) -> f64 {
    match category {
        "animals" | "insects" | "vegetables" | "bodyParts" => 0.06,
        _ => 0.93,
    }
}

fn size_base(category: &str) -> f64 {
    match category {
        "insects" => 0.05,
        "vegetables" => 0.15,
        "kitchenUtensils" => 0.2,
        "bodyParts" => 0.25,
        "tools" => 0.3,
        "clothing" => 0.3,
        "manMadeObjects" => 0.35,
        "buildingParts" => 0.45,
        "furniture" => 0.55,
        "animals" => 0.6,
        "vehicles" => 0.8,
        "buildings" => 0.95,
        _ => 0.5,
    }
}

// Deliberately tracks size_base closely so the redundancy report has a
// strong pair to surface.
fn weight_base(category: &str) -> f64 {
    match category {
        "insects" => 0.03,
        "vegetables" => 0.12,
        "clothing" => 0.18,
        "kitchenUtensils" => 0.22,
        "bodyParts" => 0.28,
        "tools" => 0.32,
        "manMadeObjects" => 0.35,
        "buildingParts" => 0.5,
        "furniture" => 0.6,
        "animals" => 0.62,
        "vehicles" => 0.85,
        "buildings" => 0.97,
        _ => 0.5,
    }
}

fn found_in_base(option: &str, category: &str) -> f64 {
    match option {
        "Home" => match category {
            "furniture" | "kitchenUtensils" => 0.9,
            "clothing" => 0.85,
            "buildingParts" => 0.7,
            "manMadeObjects" => 0.6,
            "buildings" => 0.5,
            "animals" => 0.25,
            _ => 0.12,
        },
        "Outdoors" => match category {
            "vehicles" | "buildings" => 0.9,
            "insects" => 0.85,
            "animals" => 0.8,
            "vegetables" => 0.7,
            "buildingParts" => 0.5,
            "tools" => 0.3,
            _ => 0.1,
        },
        "Workplace" => match category {
            "tools" => 0.8,
            "furniture" | "manMadeObjects" => 0.5,
            _ => 0.15,
        },
        _ => 0.0,
    }
}

enum ColumnKind {
    /// Yes/no or checklist membership, raw 0 or 1.
    Binary,
    /// Integer rating on an inclusive range.
    Scale { min: i64, max: i64 },
}

/// One emitted feature column with its per-item latent truth (0..1).
struct FeatureColumn {
    name: String,
    kind: ColumnKind,
    latent: Vec<f64>,
}

/// Per-item truth for one column: the category base plus a small
/// per-noun offset, clamped back into 0..1.
fn latent_profile(
    nouns: &[(&str, &str)],
    base: impl Fn(&str) -> f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    nouns
        .iter()
        .map(|&(_, category)| (base(category) + rng.gauss(0.0, 0.06)).clamp(0.0, 1.0))
        .collect()
}

fn build_columns(nouns: &[(&str, &str)], rng: &mut SimpleRng) -> Vec<FeatureColumn> {
    let mut columns = vec![
        FeatureColumn {
            name: "is_living".into(),
            kind: ColumnKind::Binary,
            latent: latent_profile(nouns, living_base, rng),
        },
        FeatureColumn {
            name: "is_manmade".into(),
            kind: ColumnKind::Binary,
            latent: latent_profile(nouns, manmade_base, rng),
        },
        FeatureColumn {
            name: "size".into(),
            kind: ColumnKind::Scale { min: 1, max: 5 },
            latent: latent_profile(nouns, size_base, rng),
        },
        FeatureColumn {
            name: "weight".into(),
            kind: ColumnKind::Scale { min: 1, max: 5 },
            latent: latent_profile(nouns, weight_base, rng),
        },
    ];

    // Checklist features explode into one binary column per option,
    // named featureName_<index>_<first word of the label, lowercased>.
    for (index, label) in ["Home", "Outdoors", "Workplace"].iter().enumerate() {
        let first_word = label
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();
        columns.push(FeatureColumn {
            name: format!("found_in_{index}_{first_word}"),
            kind: ColumnKind::Binary,
            latent: latent_profile(nouns, |category| found_in_base(label, category), rng),
        });
    }

    columns
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Flatten the catalog to (noun, category) in trial order.
    let nouns: Vec<(&str, &str)> = CATALOG
        .iter()
        .flat_map(|(category, members)| members.iter().map(move |&noun| (noun, *category)))
        .collect();

    let columns = build_columns(&nouns, &mut rng);

    // (workerId, assignmentId, latent noise, items covered). The last
    // human stops partway through so the completeness filter has
    // something to drop.
    let raters: Vec<(&str, &str, f64, usize)> = vec![
        ("A2JX9QTMJ3DJQK", "HIT001", 0.18, nouns.len()),
        ("A1PLF0PAL6QZ5W", "HIT002", 0.22, nouns.len()),
        ("A3TVZ7EKWTMJ1B", "HIT003", 0.3, nouns.len()),
        ("A3T04QS1NTLZ0X", "HIT004", 0.25, 40),
        ("gpt-4o", "NONE", 0.08, nouns.len()),
        ("gpt-4o-mini", "NONE", 0.12, nouns.len()),
        ("o3-mini", "NONE", 0.14, nouns.len()),
        ("gemini-2.5-pro", "NONE", 0.1, nouns.len()),
        ("gemini-2.0-flash", "NONE", 0.13, nouns.len()),
    ];

    let output_path = "sample_ratings.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record([
            "year",
            "groupName",
            "workerId",
            "assignmentId",
            "trialNumber",
            "imageName",
            "itemName",
            "itemCategory",
            "featureName",
            "rating",
            "ratingsScaled",
            "ratingsScaledMax",
        ])
        .expect("Failed to write header");

    let mut n_rows: usize = 0;
    for &(worker_id, assignment_id, noise, coverage) in &raters {
        for column in &columns {
            for (item_index, &(noun, category)) in nouns.iter().take(coverage).enumerate() {
                let truth = column.latent[item_index];
                let (raw, scaled, scaled_max) = match column.kind {
                    ColumnKind::Binary => {
                        let raw = i64::from(truth + rng.gauss(0.0, noise) > 0.5);
                        // min 0, max 1: both normalisations equal the raw value
                        (raw, raw as f64, raw as f64)
                    }
                    ColumnKind::Scale { min, max } => {
                        let span = (max - min) as f64;
                        let value = min as f64 + truth * span + rng.gauss(0.0, noise * span);
                        let raw = value.round().clamp(min as f64, max as f64) as i64;
                        (
                            raw,
                            (raw - min) as f64 / span,
                            raw as f64 / max as f64,
                        )
                    }
                };

                let trial_number = (item_index + 1).to_string();
                let image_name = format!("000_{noun}.jpg");
                let rating = raw.to_string();
                let rating_scaled = scaled.to_string();
                let rating_scaled_max = scaled_max.to_string();
                writer
                    .write_record([
                        "2025",
                        "semantic_norms",
                        worker_id,
                        assignment_id,
                        trial_number.as_str(),
                        image_name.as_str(),
                        noun,
                        category,
                        column.name.as_str(),
                        rating.as_str(),
                        rating_scaled.as_str(),
                        rating_scaled_max.as_str(),
                    ])
                    .expect("Failed to write row");
                n_rows += 1;
            }
        }
    }

    writer.flush().expect("Failed to flush output file");

    println!(
        "Wrote {n_rows} observations ({} raters x {} items x {} feature columns) to {output_path}",
        raters.len(),
        nouns.len(),
        columns.len(),
    );
}
