//! Conversions between the storage record and the wire representation.

use crate::model::{Beer, BeerDto};

/// The record tracks stock levels (`min_on_hand`, `quantity_to_brew`), not a count on hand,
/// so `quantityOnHand` stays null.
pub fn beer_to_dto(beer: &Beer) -> BeerDto {
    BeerDto {
        id: beer.id,
        version: beer.version,
        created_date: beer.created_date,
        last_modified_date: beer.last_modified_date,
        beer_name: beer.beer_name.clone(),
        beer_style: beer.beer_style,
        upc: beer.upc,
        price: beer.price,
        quantity_on_hand: None,
    }
}

/// Server-managed fields and `quantityOnHand` are never taken from a request.
pub fn dto_to_beer(dto: BeerDto) -> Beer {
    Beer {
        beer_name: dto.beer_name,
        beer_style: dto.beer_style,
        upc: dto.upc,
        price: dto.price,
        ..Default::default()
    }
}
