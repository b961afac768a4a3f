//! Frame-scheduled property animation.
//!
//! Interpolates numeric JS properties (`scrollTop`, `style.top`, ...)
//! from their current value to a target over a fixed duration, driven by
//! `requestAnimationFrame`. A property that does not exist directly on
//! the target is animated on its `style` object instead, seeded from the
//! computed style when unset. Starting an animation cancels any in-flight
//! animation on the same {target, property} pair, so rapid arrow-key
//! navigation never has two timers fighting over one property.
//!
//! The loop stops once the deadline passes; the final frame may land
//! short of the exact target value.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

pub type EasingFn = fn(f64) -> f64;

pub fn ease_linear(x: f64) -> f64 {
    x
}

/// One property to animate: target value plus an optional explicit unit
/// suffix. Without one, the unit of the property's current value is kept.
pub struct AnimProp<'a> {
    pub key: &'a str,
    pub to: f64,
    pub unit: Option<&'a str>,
}

pub fn animate(target: &JsValue, props: &[AnimProp], duration_ms: f64) {
    animate_with_easing(target, props, duration_ms, ease_linear);
}

pub fn animate_with_easing(
    target: &JsValue,
    props: &[AnimProp],
    duration_ms: f64,
    easing: EasingFn,
) {
    for prop in props {
        if let Err(e) = animate_property(target, prop, duration_ms, easing) {
            log::debug!("Skipping animation of {}: {:?}", prop.key, e);
        }
    }
}

fn animate_property(
    target: &JsValue,
    prop: &AnimProp,
    duration_ms: f64,
    easing: EasingFn,
) -> Result<(), JsValue> {
    let key = JsValue::from_str(prop.key);

    let (obj, explicit_unit) = if Reflect::has(target, &key)? {
        (target.clone(), prop.unit.map(str::to_string))
    } else {
        // Not a direct attribute: animate the style property, seeded from
        // the computed style when nothing is set inline yet
        let style = Reflect::get(target, &JsValue::from_str("style"))?;
        let current = Reflect::get(&style, &key)?;
        let unset = current.as_string().map_or(true, |s| s.is_empty());
        if unset {
            if let (Some(window), Some(element)) = (web_sys::window(), target.dyn_ref::<Element>())
            {
                if let Ok(Some(computed)) = window.get_computed_style(element) {
                    let seeded = computed
                        .get_property_value(&to_kebab_case(prop.key))
                        .unwrap_or_default();
                    Reflect::set(&style, &key, &JsValue::from_str(&seeded))?;
                }
            }
        }
        (style, prop.unit.map(str::to_string))
    };

    let current = Reflect::get(&obj, &key).unwrap_or(JsValue::UNDEFINED);
    let (start, current_unit) = parse_value(&current).unwrap_or((prop.to, None));
    let unit = explicit_unit.or(current_unit);

    start_frame_loop(
        obj,
        prop.key.to_string(),
        start,
        prop.to - start,
        unit,
        duration_ms,
        easing,
    );
    Ok(())
}

struct ActiveAnimation {
    obj: JsValue,
    key: String,
    cancelled: Rc<Cell<bool>>,
}

thread_local! {
    static ACTIVE: RefCell<Vec<ActiveAnimation>> = RefCell::new(Vec::new());
}

fn cancel_in_flight(obj: &JsValue, key: &str) {
    ACTIVE.with(|active| {
        active.borrow_mut().retain(|anim| {
            if anim.key == key && js_sys::Object::is(&anim.obj, obj) {
                anim.cancelled.set(true);
                false
            } else {
                true
            }
        });
    });
}

fn deregister(flag: &Rc<Cell<bool>>) {
    ACTIVE.with(|active| {
        active
            .borrow_mut()
            .retain(|anim| !Rc::ptr_eq(&anim.cancelled, flag));
    });
}

fn start_frame_loop(
    obj: JsValue,
    key: String,
    start: f64,
    range: f64,
    unit: Option<String>,
    duration_ms: f64,
    easing: EasingFn,
) {
    cancel_in_flight(&obj, &key);

    let cancelled = Rc::new(Cell::new(false));
    ACTIVE.with(|active| {
        active.borrow_mut().push(ActiveAnimation {
            obj: obj.clone(),
            key: key.clone(),
            cancelled: cancelled.clone(),
        });
    });

    let start_time = js_sys::Date::now();

    // Self-rescheduling frame callback; taking the closure out of the
    // handle on the last frame drops it once it returns
    let handle: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let handle_for_frame = handle.clone();
    let flag = cancelled.clone();

    *handle.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if flag.get() {
            let _ = handle_for_frame.borrow_mut().take();
            return;
        }

        let now = js_sys::Date::now();
        if now > start_time + duration_ms {
            deregister(&flag);
            let _ = handle_for_frame.borrow_mut().take();
            return;
        }

        let progress = (now - start_time) / duration_ms;
        let value = interpolate(start, range, progress, easing);
        apply_value(&obj, &key, value, unit.as_deref());

        if let Some(closure) = handle_for_frame.borrow().as_ref() {
            request_frame(closure);
        }
    }) as Box<dyn FnMut()>));

    if let Some(closure) = handle.borrow().as_ref() {
        request_frame(closure);
    };
}

fn request_frame(closure: &Closure<dyn FnMut()>) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::warn!("requestAnimationFrame failed: {:?}", e);
        }
    }
}

fn apply_value(obj: &JsValue, key: &str, value: f64, unit: Option<&str>) {
    let js_value = match unit {
        Some(unit) if !unit.is_empty() => JsValue::from_str(&format!("{value}{unit}")),
        _ => JsValue::from(value),
    };
    if Reflect::set(obj, &JsValue::from_str(key), &js_value).is_err() {
        log::debug!("Failed to set animated property {}", key);
    }
}

fn parse_value(value: &JsValue) -> Option<(f64, Option<String>)> {
    if let Some(number) = value.as_f64() {
        return Some((number, None));
    }
    let (number, unit) = split_unit(&value.as_string()?)?;
    let unit = if unit.is_empty() { None } else { Some(unit) };
    Some((number, unit))
}

/// Interpolated value at `progress` in [0, 1).
pub fn interpolate(start: f64, range: f64, progress: f64, easing: EasingFn) -> f64 {
    start + range * easing(progress)
}

/// Split a CSS-ish value like "12.5px" into number and unit suffix.
pub fn split_unit(raw: &str) -> Option<(f64, String)> {
    let s = raw.trim();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(end);
    let value: f64 = number.parse().ok()?;
    Some((value, unit.trim().to_string()))
}

/// camelCase JS property name to the kebab-case form that
/// `getPropertyValue` expects.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_unit_handles_px_values() {
        assert_eq!(split_unit("100px"), Some((100.0, "px".to_string())));
        assert_eq!(split_unit("-12.5px"), Some((-12.5, "px".to_string())));
    }

    #[test]
    fn split_unit_handles_bare_numbers() {
        assert_eq!(split_unit("42"), Some((42.0, String::new())));
        assert_eq!(split_unit("0.25"), Some((0.25, String::new())));
    }

    #[test]
    fn split_unit_rejects_non_numeric() {
        assert_eq!(split_unit(""), None);
        assert_eq!(split_unit("auto"), None);
    }

    #[test]
    fn interpolate_is_linear_by_default() {
        assert_eq!(interpolate(0.0, 100.0, 0.5, ease_linear), 50.0);
        assert_eq!(interpolate(10.0, -10.0, 1.0, ease_linear), 0.0);
        assert_eq!(interpolate(5.0, 20.0, 0.0, ease_linear), 5.0);
    }

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(to_kebab_case("scrollTop"), "scroll-top");
        assert_eq!(to_kebab_case("top"), "top");
        assert_eq!(to_kebab_case("borderTopWidth"), "border-top-width");
    }
}
