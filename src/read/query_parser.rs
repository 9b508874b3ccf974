//! Parsing of the `field:value,field2:value2` query-string syntax used by list endpoints.
//!
//! Malformed segments are dropped, never reported.

use crate::read::filters::Filterization;
use crate::read::orders::{Orderization, SortDirection};

fn pairs(input: &str) -> impl Iterator<Item = (&str, &str)> {
    input.split(',').filter_map(|segment| {
        let parts: Vec<&str> = segment.split(':').collect();
        match parts.as_slice() {
            [field, value] => Some((field.trim(), value.trim())),
            _ => None,
        }
    })
}

/// `"created_at:desc,type:asc"` -> two orderizations.
pub fn parse_orders(input: Option<&str>) -> Vec<Orderization> {
    let Some(input) = input else {
        return vec![];
    };
    pairs(input)
        .filter_map(|(field, direction)| {
            // An unknown direction would be rejected by DTO validation anyway.
            let direction = direction.parse::<SortDirection>().ok()?;
            Some(Orderization::new(field, direction))
        })
        .collect()
}

/// `"type:info,user_id:123"` -> two filterizations.
pub fn parse_filters(input: Option<&str>) -> Vec<Filterization> {
    let Some(input) = input else {
        return vec![];
    };
    pairs(input)
        .map(|(field, search)| Filterization::new(field, search))
        .collect()
}
