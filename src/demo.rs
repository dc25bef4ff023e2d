use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::SearchCriteria;
use crate::domain::{Laundry, Listing, ListingFlags, Source};

const NEIGHBORHOODS: &[(&str, f64, f64, u32, u32)] = &[
    ("Hayes Valley", 37.7752, -122.4372, 4200, 5800),
    ("Mission District", 37.7599, -122.4148, 3800, 5500),
    ("Nob Hill", 37.7920, -122.4130, 4500, 6500),
    ("Pacific Heights", 37.7925, -122.4382, 5000, 7500),
    ("SoMa", 37.7785, -122.3950, 3900, 5600),
    ("Inner Sunset", 37.7640, -122.4680, 3600, 5200),
    ("Noe Valley", 37.7510, -122.4330, 4300, 6200),
    ("Castro", 37.7609, -122.4350, 3700, 5400),
    ("Marina", 37.8020, -122.4370, 4800, 7000),
    ("Richmond", 37.7800, -122.4600, 3400, 4900),
    ("Potrero Hill", 37.7600, -122.4000, 3600, 5300),
    ("Dogpatch", 37.7580, -122.3870, 3800, 5500),
    ("North Beach", 37.8060, -122.4100, 4000, 5800),
    ("Russian Hill", 37.8000, -122.4200, 4500, 6800),
    ("Glen Park", 37.7340, -122.4340, 3500, 5000),
];

const STREETS: &[&str] = &[
    "Valencia St",
    "Fillmore St",
    "Divisadero St",
    "Market St",
    "Guerrero St",
    "Hyde St",
    "Polk St",
    "Irving St",
    "24th St",
    "Haight St",
    "Church St",
    "Folsom St",
];

const AMENITIES_POOL: &[&str] = &[
    "Dishwasher",
    "Hardwood Floors",
    "Central AC",
    "Gym",
    "Rooftop Deck",
    "Concierge",
    "Bike Storage",
    "Pool",
    "EV Charging",
    "Package Room",
    "Dog Run",
    "Co-Working Space",
];

const PROPERTY_TYPES: &[&str] = &["apartment", "condo", "townhouse"];

/// Generates realistic sample listings so the dashboard can be exercised
/// without API keys. Seeded, so the same seed reproduces the same batch.
/// A few units are intentionally emitted twice under different sources
/// (with slight price drift) so demo runs exercise deduplication too.
pub fn generate_listings(criteria: &SearchCriteria, now: DateTime<Utc>, seed: u64) -> Vec<Listing> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut listings = Vec::new();

    for (n_idx, &(_, lat, lng, low, high)) in NEIGHBORHOODS.iter().enumerate() {
        let per_neighborhood = rng.gen_range(2..=4);
        for unit_idx in 0..per_neighborhood {
            let source = *[Source::RentCast, Source::Zillow, Source::Redfin]
                .choose(&mut rng)
                .unwrap();
            let listing = synth_listing(&mut rng, criteria, now, source, n_idx, unit_idx, lat, lng, low, high);

            // Roughly one unit in five also shows up on a second source.
            if rng.gen_bool(0.2) {
                let others: Vec<Source> = [Source::RentCast, Source::Zillow, Source::Redfin]
                    .into_iter()
                    .filter(|s| *s != source)
                    .collect();
                let other = *others.choose(&mut rng).unwrap();
                let mut dupe = listing.clone();
                dupe.id = format!("{}_{}_{}", other.id(), n_idx, unit_idx);
                dupe.source = other;
                dupe.url = listing_url(other, &dupe.address, n_idx, unit_idx);
                // Sources refresh at different times; let the price drift
                // inside the dedup tolerance.
                dupe.price = (f64::from(dupe.price) * rng.gen_range(0.99..1.01)).round() as u32;
                // The copy is usually thinner than the original record.
                dupe.size_sqft = None;
                dupe.amenities.clear();
                listings.push(dupe);
            }

            listings.push(listing);
        }
    }

    info!(count = listings.len(), seed, "generated demo listings");
    listings
}

#[allow(clippy::too_many_arguments)]
fn synth_listing(
    rng: &mut StdRng,
    criteria: &SearchCriteria,
    now: DateTime<Utc>,
    source: Source,
    n_idx: usize,
    unit_idx: usize,
    lat: f64,
    lng: f64,
    low: u32,
    high: u32,
) -> Listing {
    let street = STREETS.choose(rng).unwrap();
    let street_num = rng.gen_range(100..4000);
    let address = format!("{street_num} {street}");
    let zip_code = format!("94{}", rng.gen_range(100..135));

    let amenity_count = rng.gen_range(2..=8);
    let mut pool: Vec<&str> = AMENITIES_POOL.to_vec();
    pool.shuffle(rng);
    let amenities: Vec<String> = pool
        .into_iter()
        .take(amenity_count)
        .map(str::to_string)
        .collect();

    let tri_state = |rng: &mut StdRng| match rng.gen_range(0..3) {
        0 => Some(true),
        1 => Some(false),
        _ => None,
    };
    let laundry = *[
        Some(Laundry::InUnit),
        Some(Laundry::OnSite),
        Some(Laundry::None),
        None,
    ]
    .choose(rng)
    .unwrap();

    let days_ago = rng.gen_range(0..45);

    Listing {
        id: format!("{}_{}_{}", source.id(), n_idx, unit_idx),
        source,
        url: listing_url(source, &address, n_idx, unit_idx),
        address,
        city: criteria.city.clone(),
        state: criteria.state.clone(),
        zip_code,
        price: rng.gen_range(low..=high),
        bedrooms: criteria.bedrooms,
        bathrooms: Some(*[1.0, 1.5, 2.0, 2.5].choose(rng).unwrap()),
        size_sqft: Some(rng.gen_range(900..=1800)),
        amenities,
        listed_date: Some(now - Duration::days(days_ago)),
        image_url: None,
        latitude: Some(lat + rng.gen_range(-0.008..0.008)),
        longitude: Some(lng + rng.gen_range(-0.008..0.008)),
        walk_score: rng.gen_bool(0.7).then(|| rng.gen_range(40.0..99.0)),
        property_type: Some(PROPERTY_TYPES.choose(rng).unwrap().to_string()),
        photos_count: rng.gen_range(3..=25),
        flags: ListingFlags {
            pet_friendly: tri_state(rng),
            parking: tri_state(rng),
            laundry,
        },
    }
}

fn listing_url(source: Source, address: &str, n_idx: usize, unit_idx: usize) -> String {
    let slug = address.to_lowercase().replace(' ', "-");
    match source {
        Source::Zillow => format!(
            "https://www.zillow.com/homedetails/{slug}-San-Francisco-CA/1234{n_idx}{unit_idx}_zpid/"
        ),
        Source::Redfin => {
            format!("https://www.redfin.com/CA/San-Francisco/{slug}/home/1234{n_idx}{unit_idx}")
        }
        Source::RentCast => {
            format!("https://www.rentcast.io/apartments/san-francisco-ca/{slug}")
        }
    }
}
