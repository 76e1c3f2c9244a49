//! Logical/physical size and position value types.
//!
//! Logical units are physical units divided by the window scale factor. The [`Size`] and
//! [`Position`] unions serialize externally tagged (`{"Logical": {"width": .., "height": ..}}`),
//! which is the shape the host expects for setter arguments.
//!
//! Conversions assume a finite, positive scale factor; check untrusted values with
//! [`validate_scale_factor`] first.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{HostError, HostResult};

/// Returns `scale_factor` when it can be used for unit conversion.
///
/// # Errors
///
/// Returns [`HostError::InvalidArgument`] for zero, negative or non-finite factors, which would
/// turn conversions into `inf` or `NaN`.
pub fn validate_scale_factor(scale_factor: f64) -> HostResult<f64> {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        Ok(scale_factor)
    } else {
        Err(HostError::InvalidArgument(format!(
            "scale factor must be finite and positive, got {scale_factor}"
        )))
    }
}

/// Size in logical (scale-independent) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl LogicalSize {
    /// Creates a logical size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Converts to physical units. `scale_factor` must be finite and positive.
    pub fn to_physical(self, scale_factor: f64) -> PhysicalSize {
        PhysicalSize::new(self.width * scale_factor, self.height * scale_factor)
    }
}

/// Size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PhysicalSize {
    /// Creates a physical size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Converts to logical units. `scale_factor` must be finite and positive.
    pub fn to_logical(self, scale_factor: f64) -> LogicalSize {
        LogicalSize::new(self.width / scale_factor, self.height / scale_factor)
    }
}

/// Position in logical (scale-independent) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalPosition {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl LogicalPosition {
    /// Creates a logical position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Converts to physical units. `scale_factor` must be finite and positive.
    pub fn to_physical(self, scale_factor: f64) -> PhysicalPosition {
        PhysicalPosition::new(self.x * scale_factor, self.y * scale_factor)
    }
}

/// Position in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalPosition {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl PhysicalPosition {
    /// Creates a physical position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Converts to logical units. `scale_factor` must be finite and positive.
    pub fn to_logical(self, scale_factor: f64) -> LogicalPosition {
        LogicalPosition::new(self.x / scale_factor, self.y / scale_factor)
    }
}

/// Size tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Size {
    /// Logical units.
    Logical(LogicalSize),
    /// Physical pixels.
    Physical(PhysicalSize),
}

impl Size {
    /// Returns the size in logical units.
    ///
    /// `scale_factor` must be finite and positive; see [`validate_scale_factor`].
    pub fn to_logical(self, scale_factor: f64) -> LogicalSize {
        match self {
            Self::Logical(size) => size,
            Self::Physical(size) => size.to_logical(scale_factor),
        }
    }

    /// Returns the size in physical pixels.
    ///
    /// `scale_factor` must be finite and positive; see [`validate_scale_factor`].
    pub fn to_physical(self, scale_factor: f64) -> PhysicalSize {
        match self {
            Self::Logical(size) => size.to_physical(scale_factor),
            Self::Physical(size) => size,
        }
    }

    /// Rejects non-finite or negative dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> HostResult<()> {
        let (width, height) = match self {
            Self::Logical(size) => (size.width, size.height),
            Self::Physical(size) => (size.width, size.height),
        };
        for (field, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(HostError::InvalidArgument(format!(
                    "size {field} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl From<LogicalSize> for Size {
    fn from(size: LogicalSize) -> Self {
        Self::Logical(size)
    }
}

impl From<PhysicalSize> for Size {
    fn from(size: PhysicalSize) -> Self {
        Self::Physical(size)
    }
}

impl TryFrom<Value> for Size {
    type Error = HostError;

    /// Accepts `{"Logical": {..}}` / `{"Physical": {..}}` and the flat
    /// `{"type": "Logical", "width": .., "height": ..}` shape. Anything else is rejected.
    fn try_from(value: Value) -> HostResult<Self> {
        let size = match untag(value, "size")? {
            (Unit::Logical, body) => Self::Logical(parse_body(body, "size")?),
            (Unit::Physical, body) => Self::Physical(parse_body(body, "size")?),
        };
        size.validate()?;
        Ok(size)
    }
}

/// Position tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Position {
    /// Logical units.
    Logical(LogicalPosition),
    /// Physical pixels.
    Physical(PhysicalPosition),
}

impl Position {
    /// Returns the position in logical units.
    ///
    /// `scale_factor` must be finite and positive; see [`validate_scale_factor`].
    pub fn to_logical(self, scale_factor: f64) -> LogicalPosition {
        match self {
            Self::Logical(position) => position,
            Self::Physical(position) => position.to_logical(scale_factor),
        }
    }

    /// Returns the position in physical pixels.
    ///
    /// `scale_factor` must be finite and positive; see [`validate_scale_factor`].
    pub fn to_physical(self, scale_factor: f64) -> PhysicalPosition {
        match self {
            Self::Logical(position) => position.to_physical(scale_factor),
            Self::Physical(position) => position,
        }
    }

    /// Rejects non-finite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> HostResult<()> {
        let (x, y) = match self {
            Self::Logical(position) => (position.x, position.y),
            Self::Physical(position) => (position.x, position.y),
        };
        for (field, value) in [("x", x), ("y", y)] {
            if !value.is_finite() {
                return Err(HostError::InvalidArgument(format!(
                    "position {field} must be a finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl From<LogicalPosition> for Position {
    fn from(position: LogicalPosition) -> Self {
        Self::Logical(position)
    }
}

impl From<PhysicalPosition> for Position {
    fn from(position: PhysicalPosition) -> Self {
        Self::Physical(position)
    }
}

impl TryFrom<Value> for Position {
    type Error = HostError;

    /// Accepts `{"Logical": {..}}` / `{"Physical": {..}}` and the flat
    /// `{"type": "Logical", "x": .., "y": ..}` shape. Anything else is rejected.
    fn try_from(value: Value) -> HostResult<Self> {
        let position = match untag(value, "position")? {
            (Unit::Logical, body) => Self::Logical(parse_body(body, "position")?),
            (Unit::Physical, body) => Self::Physical(parse_body(body, "position")?),
        };
        position.validate()?;
        Ok(position)
    }
}

/// Rectangle in physical pixels, as reported for tray icons.
///
/// Both the plain and the `{"Physical": {..}}` shapes are accepted for each field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    #[serde(deserialize_with = "physical_position")]
    pub position: PhysicalPosition,
    /// Extent.
    #[serde(deserialize_with = "physical_size")]
    pub size: PhysicalSize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeTagged<Tagged, Plain> {
    Tagged(Tagged),
    Plain(Plain),
}

fn physical_position<'de, D: Deserializer<'de>>(de: D) -> Result<PhysicalPosition, D::Error> {
    match MaybeTagged::<Position, PhysicalPosition>::deserialize(de)? {
        MaybeTagged::Tagged(Position::Physical(position)) | MaybeTagged::Plain(position) => {
            Ok(position)
        }
        MaybeTagged::Tagged(Position::Logical(_)) => {
            Err(D::Error::custom("expected a physical position"))
        }
    }
}

fn physical_size<'de, D: Deserializer<'de>>(de: D) -> Result<PhysicalSize, D::Error> {
    match MaybeTagged::<Size, PhysicalSize>::deserialize(de)? {
        MaybeTagged::Tagged(Size::Physical(size)) | MaybeTagged::Plain(size) => Ok(size),
        MaybeTagged::Tagged(Size::Logical(_)) => Err(D::Error::custom("expected a physical size")),
    }
}

enum Unit {
    Logical,
    Physical,
}

fn untag(value: Value, what: &str) -> HostResult<(Unit, Value)> {
    let unit_of = |tag: &str| match tag {
        "Logical" => Some(Unit::Logical),
        "Physical" => Some(Unit::Physical),
        _ => None,
    };
    let malformed = || {
        HostError::InvalidArgument(format!(
            "the `{what}` argument must be tagged as either Logical or Physical"
        ))
    };

    let Value::Object(mut map) = value else {
        return Err(malformed());
    };
    if let Some(tag) = map.remove("type") {
        let unit = tag.as_str().and_then(unit_of).ok_or_else(malformed)?;
        return Ok((unit, Value::Object(map)));
    }
    if map.len() == 1 {
        if let Some((tag, body)) = map.into_iter().next() {
            let unit = unit_of(&tag).ok_or_else(malformed)?;
            return Ok((unit, body));
        }
    }
    Err(malformed())
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value, what: &str) -> HostResult<T> {
    serde_json::from_value(body)
        .map_err(|err| HostError::InvalidArgument(format!("malformed `{what}` argument: {err}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn unusable_scale_factors_are_rejected() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_scale_factor(scale),
                Err(HostError::InvalidArgument(_))
            ));
        }
        let scale = validate_scale_factor(1.5).expect("usable factor");
        assert_eq!(
            PhysicalSize::new(30.0, 15.0).to_logical(scale),
            LogicalSize::new(20.0, 10.0)
        );
    }

    #[test]
    fn physical_to_logical_round_trip_is_stable() {
        for scale in [1.0, 1.25, 1.5, 2.0, 3.0 / 7.0] {
            let physical = PhysicalSize::new(1921.0, 1079.0);
            let back = physical.to_logical(scale).to_physical(scale);
            assert!(approx(back.width, physical.width), "width at {scale}");
            assert!(approx(back.height, physical.height), "height at {scale}");

            let position = PhysicalPosition::new(-40.0, 333.0);
            let back = position.to_logical(scale).to_physical(scale);
            assert!(approx(back.x, position.x) && approx(back.y, position.y));
        }
    }

    #[test]
    fn tagged_unions_serialize_with_unit_key() {
        assert_eq!(
            serde_json::to_value(Size::from(LogicalSize::new(800.0, 600.0))).expect("size"),
            json!({"Logical": {"width": 800.0, "height": 600.0}})
        );
        assert_eq!(
            serde_json::to_value(Position::from(PhysicalPosition::new(10.0, 20.0)))
                .expect("position"),
            json!({"Physical": {"x": 10.0, "y": 20.0}})
        );
    }

    #[test]
    fn union_conversion_uses_scale_factor() {
        let size = Size::Physical(PhysicalSize::new(300.0, 150.0));
        assert_eq!(size.to_logical(1.5), LogicalSize::new(200.0, 100.0));
        assert_eq!(size.to_physical(1.5), PhysicalSize::new(300.0, 150.0));

        let position = Position::Logical(LogicalPosition::new(5.0, 7.0));
        assert_eq!(position.to_physical(2.0), PhysicalPosition::new(10.0, 14.0));
    }

    #[test]
    fn both_json_shapes_are_accepted() {
        let nested = Size::try_from(json!({"Physical": {"width": 10, "height": 20}}))
            .expect("nested shape");
        assert_eq!(nested, Size::Physical(PhysicalSize::new(10.0, 20.0)));

        let flat = Position::try_from(json!({"type": "Logical", "x": 1.5, "y": 2}))
            .expect("flat shape");
        assert_eq!(flat, Position::Logical(LogicalPosition::new(1.5, 2.0)));
    }

    #[test]
    fn untagged_or_unknown_units_are_rejected() {
        for raw in [
            json!({"width": 1, "height": 2}),
            json!({"type": "Device", "width": 1, "height": 2}),
            json!({"Device": {"width": 1, "height": 2}}),
            json!([1, 2]),
            json!({"Logical": {"width": "wide", "height": 2}}),
        ] {
            let err = Size::try_from(raw.clone()).expect_err("malformed size");
            assert!(matches!(err, HostError::InvalidArgument(_)), "{raw}");
        }
    }

    #[test]
    fn rect_accepts_plain_and_tagged_fields() {
        let plain: Rect = serde_json::from_value(json!({
            "position": {"x": 10, "y": 20},
            "size": {"width": 16, "height": 16}
        }))
        .expect("plain rect");
        let tagged: Rect = serde_json::from_value(json!({
            "position": {"Physical": {"x": 10, "y": 20}},
            "size": {"Physical": {"width": 16, "height": 16}}
        }))
        .expect("tagged rect");

        assert_eq!(plain, tagged);
        assert!(serde_json::from_value::<Rect>(json!({
            "position": {"Logical": {"x": 1, "y": 1}},
            "size": {"width": 1, "height": 1}
        }))
        .is_err());
    }

    #[test]
    fn validation_rejects_non_finite_and_negative_values() {
        assert!(Size::from(LogicalSize::new(f64::NAN, 1.0)).validate().is_err());
        assert!(Size::from(PhysicalSize::new(-1.0, 1.0)).validate().is_err());
        assert!(Position::from(LogicalPosition::new(f64::INFINITY, 0.0))
            .validate()
            .is_err());
        assert!(Position::from(PhysicalPosition::new(-5.0, -5.0))
            .validate()
            .is_ok());
    }
}
