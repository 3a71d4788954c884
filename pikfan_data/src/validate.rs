use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in a `ContentDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateName { kind: &'static str, name: String },
    MissingReference { kind: &'static str, name: String, context: String },
    WrongCategory { name: String, expected: &'static str, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateName { kind, name } => {
                write!(f, "duplicate {kind} name '{name}'")
            },
            ValidationError::MissingReference { kind, name, context } => {
                write!(f, "missing {kind} '{name}' ({context})")
            },
            ValidationError::WrongCategory { name, expected, context } => {
                write!(f, "mob type '{name}' is not a {expected} ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a `ContentDef`.
///
/// Script contents are not checked here; the engine reports script problems itself while
/// building each mob type.
///
/// ```
/// use pikfan_data::{AreaDef, CategoryDef, ContentDef, MobTypeDef, PlacementDef, validate_content};
///
/// let content = ContentDef {
///     mob_types: vec![MobTypeDef {
///         name: "Red Pikmin".into(),
///         category: CategoryDef::Pikmin { carry_strength: 1.0, attack_power: 10.0, attack_interval: 0.8 },
///         ..MobTypeDef::default()
///     }],
///     area: AreaDef {
///         name: "garden".into(),
///         placements: vec![PlacementDef { mob_type: "Red Pikmin".into(), ..PlacementDef::default() }],
///     },
/// };
/// assert!(validate_content(&content).is_empty());
/// ```
pub fn validate_content(content: &ContentDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    track_names(
        "mob type",
        content.mob_types.iter().map(|t| t.name.as_str()),
        &mut names,
        &mut errors,
    );
    let by_name: HashMap<&str, &MobTypeDef> = content.mob_types.iter().map(|t| (t.name.as_str(), t)).collect();

    for def in &content.mob_types {
        validate_mob_type(def, &by_name, &mut errors);
    }

    if content.area.name.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "area name missing".to_string(),
        });
    }
    for (i, placement) in content.area.placements.iter().enumerate() {
        check_ref(
            "mob type",
            &placement.mob_type,
            &names,
            format!("area '{}' placement #{i}", content.area.name),
            &mut errors,
        );
        if placement.buried
            && let Some(def) = by_name.get(placement.mob_type.as_str())
            && !matches!(def.category, CategoryDef::Pikmin { .. })
        {
            errors.push(ValidationError::WrongCategory {
                name: def.name.clone(),
                expected: "pikmin",
                context: format!("area '{}' placement #{i} is buried", content.area.name),
            });
        }
    }

    errors
}

fn validate_mob_type(def: &MobTypeDef, by_name: &HashMap<&str, &MobTypeDef>, errors: &mut Vec<ValidationError>) {
    let context = format!("mob type '{}'", def.name);
    if def.name.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "mob type with empty name".to_string(),
        });
    }
    for (label, value) in [
        ("size", def.size),
        ("move_speed", def.move_speed),
        ("rotation_speed", def.rotation_speed),
        ("max_health", def.max_health),
        ("weight", def.weight),
        ("sight_radius", def.sight_radius),
        ("near_radius", def.near_radius),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(ValidationError::InvalidValue {
                context: format!("{context} {label} = {value}"),
            });
        }
    }

    let mut hitboxes = HashSet::new();
    track_names(
        "hitbox",
        def.hitboxes.iter().map(|h| h.name.as_str()),
        &mut hitboxes,
        errors,
    );
    for hitbox in &def.hitboxes {
        if hitbox.radius <= 0.0 {
            errors.push(ValidationError::InvalidValue {
                context: format!("{context} hitbox '{}' radius = {}", hitbox.name, hitbox.radius),
            });
        }
    }

    let mut animations = HashSet::new();
    track_names(
        "animation",
        def.animations.iter().map(|a| a.name.as_str()),
        &mut animations,
        errors,
    );
    for anim in &def.animations {
        if anim.duration <= 0.0 {
            errors.push(ValidationError::InvalidValue {
                context: format!("{context} animation '{}' duration = {}", anim.name, anim.duration),
            });
        }
        for hitbox in &anim.hitboxes {
            check_ref(
                "hitbox",
                hitbox,
                &hitboxes,
                format!("{context} animation '{}'", anim.name),
                errors,
            );
        }
    }

    match &def.category {
        CategoryDef::Pikmin { attack_interval, .. } if *attack_interval <= 0.0 => {
            errors.push(ValidationError::InvalidValue {
                context: format!("{context} attack_interval = {attack_interval}"),
            });
        },
        CategoryDef::Pellet { pikmin_type, .. } | CategoryDef::Onion { pikmin_type } => {
            check_pikmin_type(pikmin_type, by_name, &context, errors);
        },
        _ => {},
    }
}

fn check_pikmin_type(
    name: &str,
    by_name: &HashMap<&str, &MobTypeDef>,
    context: &str,
    errors: &mut Vec<ValidationError>,
) {
    match by_name.get(name) {
        None => errors.push(ValidationError::MissingReference {
            kind: "pikmin type",
            name: name.to_string(),
            context: context.to_string(),
        }),
        Some(def) if !matches!(def.category, CategoryDef::Pikmin { .. }) => {
            errors.push(ValidationError::WrongCategory {
                name: name.to_string(),
                expected: "pikmin",
                context: context.to_string(),
            });
        },
        Some(_) => {},
    }
}

fn track_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for name in names {
        if !set.insert(name.to_string()) {
            errors.push(ValidationError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, name: &str, set: &HashSet<String>, context: String, errors: &mut Vec<ValidationError>) {
    if !set.contains(name) {
        errors.push(ValidationError::MissingReference {
            kind,
            name: name.to_string(),
            context,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pikmin(name: &str) -> MobTypeDef {
        MobTypeDef {
            name: name.to_string(),
            category: CategoryDef::Pikmin {
                carry_strength: 1.0,
                attack_power: 10.0,
                attack_interval: 0.8,
            },
            ..MobTypeDef::default()
        }
    }

    fn base_content() -> ContentDef {
        ContentDef {
            mob_types: vec![
                pikmin("Red Pikmin"),
                MobTypeDef {
                    name: "Red Onion".into(),
                    category: CategoryDef::Onion {
                        pikmin_type: "Red Pikmin".into(),
                    },
                    ..MobTypeDef::default()
                },
            ],
            area: AreaDef {
                name: "garden".into(),
                placements: vec![PlacementDef {
                    mob_type: "Red Onion".into(),
                    ..PlacementDef::default()
                }],
            },
        }
    }

    #[test]
    fn well_formed_content_has_no_errors() {
        assert!(validate_content(&base_content()).is_empty());
    }

    #[test]
    fn duplicate_type_names_are_reported() {
        let mut content = base_content();
        content.mob_types.push(pikmin("Red Pikmin"));

        let errors = validate_content(&content);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::DuplicateName { kind, name } if *kind == "mob type" && name == "Red Pikmin")
        ));
    }

    #[test]
    fn placement_of_unknown_type_is_reported() {
        let mut content = base_content();
        content.area.placements.push(PlacementDef {
            mob_type: "Blue Pikmin".into(),
            ..PlacementDef::default()
        });

        let errors = validate_content(&content);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, name, .. } if *kind == "mob type" && name == "Blue Pikmin")
        ));
    }

    #[test]
    fn onion_for_non_pikmin_type_is_reported() {
        let mut content = base_content();
        content.mob_types[1].category = CategoryDef::Onion {
            pikmin_type: "Red Onion".into(),
        };

        let errors = validate_content(&content);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ValidationError::WrongCategory { expected, .. } if *expected == "pikmin"))
        );
    }

    #[test]
    fn animation_with_unknown_hitbox_is_reported() {
        let mut content = base_content();
        content.mob_types[0].animations.push(AnimationDef {
            name: "attack".into(),
            duration: 0.5,
            looping: false,
            hitboxes: vec!["claw".into()],
        });

        let errors = validate_content(&content);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, name, .. } if *kind == "hitbox" && name == "claw")
        ));
    }

    #[test]
    fn negative_stats_and_buried_non_pikmin_are_reported() {
        let mut content = base_content();
        content.mob_types[1].weight = -1.0;
        content.area.placements[0].buried = true;

        let errors = validate_content(&content);
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[0].to_string().contains("weight"));
        assert!(matches!(errors[1], ValidationError::WrongCategory { .. }));
    }
}
