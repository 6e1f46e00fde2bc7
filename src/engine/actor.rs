/// body geometry helpers shared by entity step logic
use bevy_math::Rect;
use bevy_math::Vec2;

/// Which face of a cloud a body made contact with. Only vertical
/// contact consumes a cloud; side grazes are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactSide {
    Above,
    Below,
    Side,
}

/// Classify an overlap between two bodies. The shallower penetration
/// axis decides between a vertical contact and a side graze.
pub fn contact_side(body: &Rect, other: &Rect) -> Option<ContactSide> {
    let overlap = body.intersect(*other);
    if overlap.is_empty() {
        return None;
    }
    if overlap.width() < overlap.height() {
        return Some(ContactSide::Side);
    }
    if body.center().y <= other.center().y {
        Some(ContactSide::Above)
    } else {
        Some(ContactSide::Below)
    }
}

/// Keep a body of width `width` inside the horizontal world bounds.
pub fn clamp_x(x: f32, width: f32, world_width: f32) -> f32 {
    x.clamp(0., world_width - width)
}

/// Standing on the bottom world boundary. The floor is the only
/// surface a body can rest on; clouds are consumed on contact.
pub fn on_floor(body: &Rect, world_size: Vec2) -> bool {
    body.max.y >= world_size.y
}
