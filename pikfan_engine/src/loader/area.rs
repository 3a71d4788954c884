//! Area placement: spawning the mobs an `AreaDef` lists.

use anyhow::{Context, Result};
use log::info;
use pikfan_data::AreaDef;

use crate::mob_type::MobCategory;
use crate::world::World;

/// Spawn every placement of `area` into `world`, in order. The first leader placed becomes the
/// current leader.
///
/// # Errors
/// - if a placement names a mob type the world doesn't have
pub fn place_area(world: &mut World, area: &AreaDef) -> Result<()> {
    world.area_name.clone_from(&area.name);
    info!("placing {} mobs in area '{}'", area.placements.len(), area.name);
    for (i, placement) in area.placements.iter().enumerate() {
        world
            .place_mob(i, placement)
            .with_context(|| format!("placing '{}' at ({}, {})", placement.mob_type, placement.x, placement.y))?;
    }

    if world.cur_leader.is_none()
        && let Some(leader) = world.mobs.iter().find(|m| m.category == MobCategory::Leader).map(|m| m.id)
    {
        world.set_current_leader(leader);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mob_type::{LeaderTraits, MobKind, MobType};
    use pikfan_data::PlacementDef;

    fn world() -> World {
        let mut world = World::new_empty();
        world.types.insert(MobType {
            move_speed: 100.0,
            ..MobType::basic("Olimar", MobKind::Leader(LeaderTraits { whistle_range: 80.0 }))
        });
        world
    }

    fn placement(mob_type: &str, x: f32) -> PlacementDef {
        PlacementDef {
            mob_type: mob_type.into(),
            x,
            ..PlacementDef::default()
        }
    }

    #[test]
    fn placed_ids_are_stable_and_first_leader_leads() {
        let area = AreaDef {
            name: "garden".into(),
            placements: vec![placement("Olimar", 0.0), placement("Olimar", 50.0)],
        };
        let mut a = world();
        place_area(&mut a, &area).expect("placed");
        let mut b = world();
        place_area(&mut b, &area).expect("placed");
        assert_eq!(a.mobs.len(), 2);
        assert_eq!(a.mobs[1].id, b.mobs[1].id);
        assert_eq!(a.cur_leader, Some(a.mobs[0].id));
        assert!(a.mobs[0].party.is_some());
    }

    #[test]
    fn unknown_types_fail_with_context() {
        let area = AreaDef {
            name: "garden".into(),
            placements: vec![placement("Louie", 0.0)],
        };
        let err = place_area(&mut world(), &area).expect_err("unknown type");
        let text = format!("{err:#}");
        assert!(text.contains("Louie"));
    }
}
