//! # Reference Unit Table
//!
//! The static unit → (unit group, quantity kind) mapping backing the
//! catalog. Identifiers here are fixed reference data shared with the
//! openLCA unit groups and flow properties shipped by the LCA Commons, so
//! a document written today resolves the same `kg` tomorrow.
//!
//! Read-only: nothing in this table is ever created or modified during a
//! build; exchanges only look units up.

/// One row of the reference table: a named unit, its group, and the
/// quantity kind it measures.
#[derive(Debug, Clone, Copy)]
pub struct UnitEntry {
    pub name: &'static str,
    pub unit_id: &'static str,
    /// Factor to the group's reference unit.
    pub conversion_factor: f64,
    pub is_ref_unit: bool,
    pub group: &'static str,
    pub group_id: &'static str,
    pub property: &'static str,
    pub property_id: &'static str,
}

const MASS_GROUP: &str = "Units of mass";
const MASS_GROUP_ID: &str = "93a60a57-a4c8-11da-a746-0800200c9a66";
const MASS_PROP: &str = "Mass";
const MASS_PROP_ID: &str = "93a60a56-a3c8-11da-a746-0800200b9a66";

const ENERGY_GROUP: &str = "Units of energy";
const ENERGY_GROUP_ID: &str = "93a60a57-a3c8-18da-a746-0800200c9a66";
const ENERGY_PROP: &str = "Energy";
const ENERGY_PROP_ID: &str = "f6811440-ee37-11de-8a39-0800200c9a66";

const VOLUME_GROUP: &str = "Units of volume";
const VOLUME_GROUP_ID: &str = "93a60a57-a3c8-22da-a746-0800200c9a66";
const VOLUME_PROP: &str = "Volume";
const VOLUME_PROP_ID: &str = "93a60a56-a3c8-22da-a746-0800200c9a66";

const ITEMS_GROUP: &str = "Units of items";
const ITEMS_GROUP_ID: &str = "5beb6eed-33a9-47b8-9ede-1dfe8f679159";
const ITEMS_PROP: &str = "Number of items";
const ITEMS_PROP_ID: &str = "01846770-4cfe-4a25-8ad9-919d8d378345";

const LENGTH_GROUP: &str = "Units of length";
const LENGTH_GROUP_ID: &str = "93a60a57-a3c8-14da-a746-0800200c9a66";
const LENGTH_PROP: &str = "Length";
const LENGTH_PROP_ID: &str = "93a60a56-a3c8-14da-a746-0800200c9a66";

const TRANSPORT_GROUP: &str = "Units of transport";
const TRANSPORT_GROUP_ID: &str = "af638906-2a16-42b8-8f4f-9f2b1aa0f607";
const TRANSPORT_PROP: &str = "Goods transport (mass*distance)";
const TRANSPORT_PROP_ID: &str = "838aaa20-0117-11db-92e3-0800200c9a66";

/// The full reference table.
///
/// Names are matched exactly after trimming; the spelling follows the
/// LCA Commons unit lists (`sh tn`, `Item(s)`, `t*km`).
pub const UNIT_TABLE: &[UnitEntry] = &[
    // Mass
    UnitEntry {
        name: "kg",
        unit_id: "20aadc24-a391-41cf-b340-3e4529f44bde",
        conversion_factor: 1.0,
        is_ref_unit: true,
        group: MASS_GROUP,
        group_id: MASS_GROUP_ID,
        property: MASS_PROP,
        property_id: MASS_PROP_ID,
    },
    UnitEntry {
        name: "g",
        unit_id: "1c3a9695-398d-4b1f-b07e-a8715b610f70",
        conversion_factor: 0.001,
        is_ref_unit: false,
        group: MASS_GROUP,
        group_id: MASS_GROUP_ID,
        property: MASS_PROP,
        property_id: MASS_PROP_ID,
    },
    UnitEntry {
        name: "t",
        unit_id: "2c25c07f-df24-4907-b69f-4b53e9ad3d7d",
        conversion_factor: 1000.0,
        is_ref_unit: false,
        group: MASS_GROUP,
        group_id: MASS_GROUP_ID,
        property: MASS_PROP,
        property_id: MASS_PROP_ID,
    },
    UnitEntry {
        name: "sh tn",
        unit_id: "b8c4ab93-9028-4b4e-8e06-d4b776e2569b",
        conversion_factor: 907.18474,
        is_ref_unit: false,
        group: MASS_GROUP,
        group_id: MASS_GROUP_ID,
        property: MASS_PROP,
        property_id: MASS_PROP_ID,
    },
    UnitEntry {
        name: "lb",
        unit_id: "352a2b16-b9d8-4f2c-9df9-11fe8d893f2a",
        conversion_factor: 0.45359237,
        is_ref_unit: false,
        group: MASS_GROUP,
        group_id: MASS_GROUP_ID,
        property: MASS_PROP,
        property_id: MASS_PROP_ID,
    },
    // Energy
    UnitEntry {
        name: "MJ",
        unit_id: "52765a6c-3896-43c2-b2f4-c679acf13efe",
        conversion_factor: 1.0,
        is_ref_unit: true,
        group: ENERGY_GROUP,
        group_id: ENERGY_GROUP_ID,
        property: ENERGY_PROP,
        property_id: ENERGY_PROP_ID,
    },
    UnitEntry {
        name: "kWh",
        unit_id: "92e3bd49-8ed5-4885-9db6-fc88c7afcfcb",
        conversion_factor: 3.6,
        is_ref_unit: false,
        group: ENERGY_GROUP,
        group_id: ENERGY_GROUP_ID,
        property: ENERGY_PROP,
        property_id: ENERGY_PROP_ID,
    },
    UnitEntry {
        name: "MWh",
        unit_id: "97f1bbbc-f4a6-4f69-b2f3-7a1b8e9b5bd2",
        conversion_factor: 3600.0,
        is_ref_unit: false,
        group: ENERGY_GROUP,
        group_id: ENERGY_GROUP_ID,
        property: ENERGY_PROP,
        property_id: ENERGY_PROP_ID,
    },
    UnitEntry {
        name: "GJ",
        unit_id: "4ea18fb5-68dc-47e2-99b9-e03e2da02fda",
        conversion_factor: 1000.0,
        is_ref_unit: false,
        group: ENERGY_GROUP,
        group_id: ENERGY_GROUP_ID,
        property: ENERGY_PROP,
        property_id: ENERGY_PROP_ID,
    },
    UnitEntry {
        name: "btu",
        unit_id: "55244053-94ba-404e-9172-cb279d905e0f",
        conversion_factor: 0.001055056,
        is_ref_unit: false,
        group: ENERGY_GROUP,
        group_id: ENERGY_GROUP_ID,
        property: ENERGY_PROP,
        property_id: ENERGY_PROP_ID,
    },
    // Volume
    UnitEntry {
        name: "m3",
        unit_id: "e9de2f5b-46b9-48cf-9e93-163c1b8e9c8a",
        conversion_factor: 1.0,
        is_ref_unit: true,
        group: VOLUME_GROUP,
        group_id: VOLUME_GROUP_ID,
        property: VOLUME_PROP,
        property_id: VOLUME_PROP_ID,
    },
    UnitEntry {
        name: "l",
        unit_id: "c51d2713-2c65-4a44-b387-a8b5dd41b344",
        conversion_factor: 0.001,
        is_ref_unit: false,
        group: VOLUME_GROUP,
        group_id: VOLUME_GROUP_ID,
        property: VOLUME_PROP,
        property_id: VOLUME_PROP_ID,
    },
    UnitEntry {
        name: "gal",
        unit_id: "13d75061-69a9-48a5-95d1-9f3e4a42c43a",
        conversion_factor: 0.003785412,
        is_ref_unit: false,
        group: VOLUME_GROUP,
        group_id: VOLUME_GROUP_ID,
        property: VOLUME_PROP,
        property_id: VOLUME_PROP_ID,
    },
    // Items
    UnitEntry {
        name: "Item(s)",
        unit_id: "6dabe201-aaac-4509-92f0-d00c26cb72ab",
        conversion_factor: 1.0,
        is_ref_unit: true,
        group: ITEMS_GROUP,
        group_id: ITEMS_GROUP_ID,
        property: ITEMS_PROP,
        property_id: ITEMS_PROP_ID,
    },
    // Length
    UnitEntry {
        name: "m",
        unit_id: "28b2a383-fd9a-43c6-9dbd-0fc95e3c14c8",
        conversion_factor: 1.0,
        is_ref_unit: true,
        group: LENGTH_GROUP,
        group_id: LENGTH_GROUP_ID,
        property: LENGTH_PROP,
        property_id: LENGTH_PROP_ID,
    },
    UnitEntry {
        name: "km",
        unit_id: "9a65d103-7de6-4cbc-9a87-9c3ae7bdd8ec",
        conversion_factor: 1000.0,
        is_ref_unit: false,
        group: LENGTH_GROUP,
        group_id: LENGTH_GROUP_ID,
        property: LENGTH_PROP,
        property_id: LENGTH_PROP_ID,
    },
    // Transport
    UnitEntry {
        name: "t*km",
        unit_id: "7ef0e8e6-cc7f-41a7-a1e0-9b7e6b1c8d9a",
        conversion_factor: 1.0,
        is_ref_unit: true,
        group: TRANSPORT_GROUP,
        group_id: TRANSPORT_GROUP_ID,
        property: TRANSPORT_PROP,
        property_id: TRANSPORT_PROP_ID,
    },
];

/// Look up a unit entry by exact name (after trimming).
#[must_use]
pub fn entry(name: &str) -> Option<&'static UnitEntry> {
    let trimmed = name.trim();
    UNIT_TABLE.iter().find(|e| e.name == trimmed)
}

// =============================================================================
// TESTS
// =============================================================================
