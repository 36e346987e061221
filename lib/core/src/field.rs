//! Field catalog
//!
//! The closed set of filterable fields. Every field belongs to exactly one
//! attribute group and has a fixed value kind, so request validation can
//! reject unknown names before any record is touched.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute group a field lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldGroup {
    /// Listing metadata (price, condition, return policy, ...)
    Details,
    /// Regex-extracted specs
    Derived,
    /// AI-assessed condition axes
    LlmDerived,
}

impl FieldGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Details => "details",
            FieldGroup::Derived => "derived",
            FieldGroup::LlmDerived => "llmDerived",
        }
    }

    /// Fields declared in this group, in catalog order
    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        FieldName::ALL.iter().copied().filter(move |f| f.group() == *self)
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How values of a field are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Case/whitespace-normalized strings, edit distance for variants
    Text,
    /// Numbers, absolute difference for variants
    Numeric,
    /// Booleans, direct match only
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    // details
    Title,
    Condition,
    Price,
    ReturnsAccepted,
    ReturnShippingCostPayer,
    RefundMethod,
    ItemWebUrl,
    // derived
    ReleaseYear,
    LaptopModel,
    CpuModel,
    CpuFamily,
    CpuSpeed,
    RamSize,
    SsdSize,
    ScreenSize,
    Color,
    ModelNumber,
    ModelId,
    PartNumber,
    SpecsCompleteness,
    SpecsConsistency,
    // llmDerived
    Charger,
    Battery,
    Screen,
    Keyboard,
    Housing,
    Audio,
    Ports,
    Functionality,
    ComponentListing,
}

impl FieldName {
    pub const ALL: [FieldName; 30] = [
        FieldName::Title,
        FieldName::Condition,
        FieldName::Price,
        FieldName::ReturnsAccepted,
        FieldName::ReturnShippingCostPayer,
        FieldName::RefundMethod,
        FieldName::ItemWebUrl,
        FieldName::ReleaseYear,
        FieldName::LaptopModel,
        FieldName::CpuModel,
        FieldName::CpuFamily,
        FieldName::CpuSpeed,
        FieldName::RamSize,
        FieldName::SsdSize,
        FieldName::ScreenSize,
        FieldName::Color,
        FieldName::ModelNumber,
        FieldName::ModelId,
        FieldName::PartNumber,
        FieldName::SpecsCompleteness,
        FieldName::SpecsConsistency,
        FieldName::Charger,
        FieldName::Battery,
        FieldName::Screen,
        FieldName::Keyboard,
        FieldName::Housing,
        FieldName::Audio,
        FieldName::Ports,
        FieldName::Functionality,
        FieldName::ComponentListing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Condition => "condition",
            FieldName::Price => "price",
            FieldName::ReturnsAccepted => "returnsAccepted",
            FieldName::ReturnShippingCostPayer => "returnShippingCostPayer",
            FieldName::RefundMethod => "refundMethod",
            FieldName::ItemWebUrl => "itemWebUrl",
            FieldName::ReleaseYear => "releaseYear",
            FieldName::LaptopModel => "laptopModel",
            FieldName::CpuModel => "cpuModel",
            FieldName::CpuFamily => "cpuFamily",
            FieldName::CpuSpeed => "cpuSpeed",
            FieldName::RamSize => "ramSize",
            FieldName::SsdSize => "ssdSize",
            FieldName::ScreenSize => "screenSize",
            FieldName::Color => "color",
            FieldName::ModelNumber => "modelNumber",
            FieldName::ModelId => "modelId",
            FieldName::PartNumber => "partNumber",
            FieldName::SpecsCompleteness => "specsCompleteness",
            FieldName::SpecsConsistency => "specsConsistency",
            FieldName::Charger => "charger",
            FieldName::Battery => "battery",
            FieldName::Screen => "screen",
            FieldName::Keyboard => "keyboard",
            FieldName::Housing => "housing",
            FieldName::Audio => "audio",
            FieldName::Ports => "ports",
            FieldName::Functionality => "functionality",
            FieldName::ComponentListing => "componentListing",
        }
    }

    pub fn group(&self) -> FieldGroup {
        use FieldName::*;
        match self {
            Title | Condition | Price | ReturnsAccepted | ReturnShippingCostPayer
            | RefundMethod | ItemWebUrl => FieldGroup::Details,
            ReleaseYear | LaptopModel | CpuModel | CpuFamily | CpuSpeed | RamSize | SsdSize
            | ScreenSize | Color | ModelNumber | ModelId | PartNumber | SpecsCompleteness
            | SpecsConsistency => FieldGroup::Derived,
            Charger | Battery | Screen | Keyboard | Housing | Audio | Ports | Functionality
            | ComponentListing => FieldGroup::LlmDerived,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldName::Price
            | FieldName::CpuSpeed
            | FieldName::RamSize
            | FieldName::SsdSize
            | FieldName::ScreenSize => FieldKind::Numeric,
            FieldName::ReturnsAccepted => FieldKind::Boolean,
            _ => FieldKind::Text,
        }
    }

    /// Categorical fields whose order comes from a stored rank, not their text
    pub fn is_ranked(&self) -> bool {
        use FieldName::*;
        matches!(
            self,
            Condition
                | SpecsCompleteness
                | SpecsConsistency
                | Charger
                | Battery
                | Screen
                | Keyboard
                | Housing
                | Audio
                | Ports
                | Functionality
                | ComponentListing
        )
    }

    /// Main hardware fields, which also match the analysis `bestGuess`
    pub fn has_best_guess(&self) -> bool {
        use FieldName::*;
        matches!(
            self,
            ReleaseYear | LaptopModel | CpuModel | CpuSpeed | RamSize | SsdSize | ScreenSize
        )
    }

    /// Look a field up by its wire name across all groups.
    ///
    /// `modelName` is accepted as an alias of `laptopModel` and `returnable` of
    /// `returnsAccepted`.
    pub fn parse(name: &str) -> Option<FieldName> {
        match name.trim() {
            "modelName" => Some(FieldName::LaptopModel),
            "returnable" => Some(FieldName::ReturnsAccepted),
            name => FieldName::ALL.iter().copied().find(|f| f.as_str() == name),
        }
    }

    /// Resolve a wire field name, optionally checking it against a declared group.
    pub fn resolve(group: Option<FieldGroup>, name: &str) -> Result<FieldName> {
        let field = FieldName::parse(name).ok_or_else(|| match group {
            Some(g) => Error::invalid(format!("unknown field '{}' for group '{}'", name, g)),
            None => Error::invalid(format!("unknown field '{}'", name)),
        })?;

        match group {
            Some(g) if field.group() != g => Err(Error::invalid(format!(
                "field '{}' does not belong to group '{}' (declared in '{}')",
                name,
                g,
                field.group()
            ))),
            _ => Ok(field),
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
