use crate::types::CountyData;
use rand::Rng;
use std::fmt;

/// Population and area shown on the county card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountyStats {
    pub population: u32,
    pub area_km2: u32,
}

/// Where the card's statistics come from.
pub trait StatsSource {
    fn stats_for(&mut self, county: &CountyData) -> CountyStats;
}

/// Placeholder figures drawn at random on every popup open. Stands in until a real
/// census source is wired up.
pub struct MockStats<R: Rng> {
    rng: R,
}

impl<R: Rng> MockStats<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl MockStats<rand::rngs::ThreadRng> {
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> StatsSource for MockStats<R> {
    fn stats_for(&mut self, _county: &CountyData) -> CountyStats {
        CountyStats {
            population: self.rng.gen_range(100_000..2_100_000),
            area_km2: self.rng.gen_range(5_000..55_000),
        }
    }
}

/// Everything the popup displays for a selected county.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyDetails {
    pub county: CountyData,
    pub stats: CountyStats,
    pub capital: String,
    pub description: String,
}

impl CountyDetails {
    pub fn build(county: CountyData, stats: &mut dyn StatsSource) -> Self {
        let stats = stats.stats_for(&county);
        let capital = county_capital(&county.shape_name).to_string();
        let description = format!(
            "{} County is one of Kenya's 47 counties, known for its unique landscape and cultural heritage.",
            county.shape_name
        );
        Self {
            county,
            stats,
            capital,
            description,
        }
    }
}

impl fmt::Display for CountyDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} County [{}]", self.county.shape_name, self.county.shape_iso)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "  Population:          {}", group_thousands(self.stats.population))?;
        writeln!(f, "  Area:                {} km²", group_thousands(self.stats.area_km2))?;
        writeln!(f, "  County Headquarters: {}", self.capital)?;
        write!(f, "  Administrative Level: {}", self.county.shape_type)
    }
}

pub fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

const CAPITALS: &[(&str, &str)] = &[
    ("Nairobi", "Nairobi"),
    ("Mombasa", "Mombasa"),
    ("Turkana", "Lodwar"),
    ("Marsabit", "Marsabit"),
    ("Wajir", "Wajir"),
    ("Mandera", "Mandera"),
    ("Isiolo", "Isiolo"),
    ("Garissa", "Garissa"),
    ("Tana River", "Hola"),
    ("Lamu", "Lamu"),
    ("Taita Taveta", "Voi"),
    ("Kwale", "Kwale"),
    ("Kilifi", "Kilifi"),
    ("Makueni", "Wote"),
    ("Machakos", "Machakos"),
    ("Kitui", "Kitui"),
    ("Embu", "Embu"),
    ("Tharaka Nithi", "Kathwana"),
    ("Meru", "Meru"),
    ("Nyeri", "Nyeri"),
    ("Kirinyaga", "Kerugoya"),
    ("Murang'a", "Murang'a"),
    ("Kiambu", "Kiambu"),
    ("Nakuru", "Nakuru"),
    ("Kajiado", "Kajiado"),
    ("Kericho", "Kericho"),
    ("Bomet", "Bomet"),
    ("Narok", "Narok"),
    ("Samburu", "Maralal"),
    ("Trans Nzoia", "Kitale"),
    ("Uasin Gishu", "Eldoret"),
    ("Elgeyo Marakwet", "Iten"),
    ("Nandi", "Kapsabet"),
    ("Baringo", "Kabarnet"),
    ("Laikipia", "Nanyuki"),
    ("West Pokot", "Kapenguria"),
    ("Kakamega", "Kakamega"),
    ("Vihiga", "Vihiga"),
    ("Bungoma", "Bungoma"),
    ("Busia", "Busia"),
    ("Siaya", "Siaya"),
    ("Kisumu", "Kisumu"),
    ("Homa Bay", "Homa Bay"),
    ("Migori", "Migori"),
    ("Kisii", "Kisii"),
    ("Nyamira", "Nyamira"),
    ("Nyandarua", "Ol Kalou"),
];

/// County headquarters; falls back to the county name.
pub fn county_capital(name: &str) -> &str {
    CAPITALS
        .iter()
        .find(|(county, _)| *county == name)
        .map(|(_, capital)| *capital)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CountyProperties;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixed;

    impl StatsSource for Fixed {
        fn stats_for(&mut self, _county: &CountyData) -> CountyStats {
            CountyStats {
                population: 4_397_073,
                area_km2: 696,
            }
        }
    }

    fn county(name: &str) -> CountyData {
        CountyData::from(&CountyProperties {
            shape_name: Some(name.into()),
            shape_iso: Some("KE-30".into()),
            shape_type: Some("ADM1".into()),
            ..Default::default()
        })
    }

    #[test]
    fn capitals_cover_all_counties() {
        assert_eq!(CAPITALS.len(), 47);
        assert_eq!(county_capital("Turkana"), "Lodwar");
        assert_eq!(county_capital("Murang'a"), "Murang'a");
        assert_eq!(county_capital("Atlantis"), "Atlantis");
    }

    #[test]
    fn mock_stats_stay_in_range() {
        let mut stats = MockStats::new(StdRng::seed_from_u64(7));
        let c = county("Nairobi");
        for _ in 0..200 {
            let s = stats.stats_for(&c);
            assert!((100_000..2_100_000).contains(&s.population));
            assert!((5_000..55_000).contains(&s.area_km2));
        }
    }

    #[test]
    fn details_card() {
        let details = CountyDetails::build(county("Nairobi"), &mut Fixed);
        assert_eq!(details.capital, "Nairobi");
        assert!(details.description.starts_with("Nairobi County is one of Kenya's 47 counties"));

        let card = details.to_string();
        assert!(card.contains("Nairobi County [KE-30]"));
        assert!(card.contains("4,397,073"));
        assert!(card.contains("696 km²"));
        assert!(card.contains("Administrative Level: ADM1"));
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(2_099_999), "2,099,999");
    }
}
