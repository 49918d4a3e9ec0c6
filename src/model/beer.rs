use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Fixed set of beer styles. Wire form is the upper-case name (e.g. `PALE_ALE`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeerStyle {
    Lager,
    Pilsner,
    Stout,
    Gose,
    Porter,
    Ale,
    Wheat,
    Ipa,
    PaleAle,
    Saison,
}

impl BeerStyle {
    pub const ALL: [BeerStyle; 10] = [
        BeerStyle::Lager,
        BeerStyle::Pilsner,
        BeerStyle::Stout,
        BeerStyle::Gose,
        BeerStyle::Porter,
        BeerStyle::Ale,
        BeerStyle::Wheat,
        BeerStyle::Ipa,
        BeerStyle::PaleAle,
        BeerStyle::Saison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BeerStyle::Lager => "LAGER",
            BeerStyle::Pilsner => "PILSNER",
            BeerStyle::Stout => "STOUT",
            BeerStyle::Gose => "GOSE",
            BeerStyle::Porter => "PORTER",
            BeerStyle::Ale => "ALE",
            BeerStyle::Wheat => "WHEAT",
            BeerStyle::Ipa => "IPA",
            BeerStyle::PaleAle => "PALE_ALE",
            BeerStyle::Saison => "SAISON",
        }
    }
}

impl fmt::Display for BeerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBeerStyle(pub String);

impl fmt::Display for UnknownBeerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown beer style '{}'", self.0)
    }
}

impl std::error::Error for UnknownBeerStyle {}

impl FromStr for BeerStyle {
    type Err = UnknownBeerStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BeerStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| UnknownBeerStyle(s.to_string()))
    }
}

/// Storage record. Every column may be absent on a record that has not been saved yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Beer {
    pub id: Option<Uuid>,
    pub version: Option<i64>,
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub beer_name: Option<String>,
    pub beer_style: Option<BeerStyle>,
    pub upc: Option<i64>,
    pub price: Option<Decimal>,
    pub min_on_hand: Option<i32>,
    pub quantity_to_brew: Option<i32>,
}

/// Wire representation of a beer. All keys are always present in responses; unset values are `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BeerDto {
    /// Id of beer.
    pub id: Option<Uuid>,
    /// Version number
    pub version: Option<i64>,
    /// Date created
    pub created_date: Option<DateTime<Utc>>,
    /// Date updated
    pub last_modified_date: Option<DateTime<Utc>>,
    /// Beer name
    #[schema(example = "Nice Ale")]
    pub beer_name: Option<String>,
    /// Beer style
    pub beer_style: Option<BeerStyle>,
    /// UPC of beer
    #[schema(example = 123123123123_i64)]
    pub upc: Option<i64>,
    /// Price
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    #[schema(value_type = Option<f64>, example = 9.99)]
    pub price: Option<Decimal>,
    /// Quantity on hand
    pub quantity_on_hand: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn style_round_trips_through_wire_name() {
        for style in BeerStyle::ALL {
            assert_eq!(style.as_str().parse::<BeerStyle>(), Ok(style));
        }
        assert_eq!(serde_json::to_value(BeerStyle::PaleAle).unwrap(), json!("PALE_ALE"));
        assert!("pale ale".parse::<BeerStyle>().is_err());
    }

    #[test]
    fn empty_dto_serializes_every_key_as_null() {
        let value = serde_json::to_value(BeerDto::default()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "id",
            "version",
            "createdDate",
            "lastModifiedDate",
            "beerName",
            "beerStyle",
            "upc",
            "price",
            "quantityOnHand",
        ] {
            assert_eq!(obj.get(key), Some(&serde_json::Value::Null), "{key}");
        }
        assert_eq!(obj.len(), 9);
    }

    #[test]
    fn partial_payload_deserializes_with_price_as_number() {
        let dto: BeerDto = serde_json::from_value(json!({
            "beerName": "Nice Ale",
            "beerStyle": "ALE",
            "price": 9.99,
            "upc": 123123123123_i64
        }))
        .unwrap();
        assert_eq!(dto.beer_name.as_deref(), Some("Nice Ale"));
        assert_eq!(dto.beer_style, Some(BeerStyle::Ale));
        assert_eq!(dto.price, Some(Decimal::new(999, 2)));
        assert_eq!(dto.upc, Some(123123123123));
        assert_eq!(dto.id, None);

        let back = serde_json::to_value(&dto).unwrap();
        assert_eq!(back["price"].to_string(), "9.99");
    }

    #[test]
    fn price_keeps_every_digit_on_the_wire() {
        let dto: BeerDto =
            serde_json::from_str(r#"{"beerName":"Big Ale","price":12345678901234567.89}"#).unwrap();
        assert_eq!(dto.price, Some("12345678901234567.89".parse().unwrap()));

        let text = serde_json::to_string(&dto).unwrap();
        assert!(text.contains(r#""price":12345678901234567.89"#), "{text}");
    }
}
