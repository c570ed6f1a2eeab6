//! Validation and bookkeeping for player tower commands.

use log::debug;
use rampart_core::{
    CommandError, Event, GameConfig, TileCoord, Tower, TowerId, TowerKind, UpgradeId,
};

use crate::World;

/// Builds a tower after checking type, tile, occupancy and funds.
pub(crate) fn place(
    world: &mut World,
    config: &GameConfig,
    kind: TowerKind,
    tile: TileCoord,
) -> Result<Event, CommandError> {
    let Some(definition) = config.tower(&kind) else {
        return Err(CommandError::UnknownTowerKind(kind));
    };
    let grid = &world.level.grid;
    let Some(terrain) = grid.terrain(tile) else {
        return Err(CommandError::OutOfBounds(tile));
    };
    if !terrain.is_buildable() {
        return Err(CommandError::NotBuildable(tile));
    }
    if world.occupancy.contains_key(&tile) {
        return Err(CommandError::Occupied(tile));
    }
    let position = grid.tile_center(tile);
    let cost = definition.cost;
    world.spend(cost)?;

    let stats = definition.stats;
    let tower = world.towers.allocate(|id| Tower {
        id,
        kind: kind.clone(),
        tile,
        position,
        cooldown: 0.0,
        upgrades: Vec::new(),
        invested: cost,
        stats,
    });
    let _ = world.occupancy.insert(tile, tower);
    debug!("placed {kind} tower {tower} at {tile:?} for {cost}");

    Ok(Event::TowerPlaced {
        tower,
        kind,
        tile,
        cost,
    })
}

/// Removes a tower and refunds the difficulty's share of its investment.
pub(crate) fn sell(
    world: &mut World,
    config: &GameConfig,
    tower: TowerId,
) -> Result<Event, CommandError> {
    let Some(removed) = world.towers.remove(tower) else {
        return Err(CommandError::UnknownTower(tower));
    };
    let _ = world.occupancy.remove(&removed.tile);

    let percent = config
        .difficulty(world.level.difficulty)
        .map_or(0, |definition| definition.refund_percent);
    let refund = refund(removed.invested, percent);
    world.currency = world.currency.saturating_add(refund);
    debug!("sold tower {tower} for {refund}");

    Ok(Event::TowerSold { tower, refund })
}

/// Buys a one-time upgrade and refolds the tower's stats from its base.
pub(crate) fn upgrade(
    world: &mut World,
    config: &GameConfig,
    tower: TowerId,
    upgrade: UpgradeId,
) -> Result<Event, CommandError> {
    let Some(current) = world.towers.get(tower) else {
        return Err(CommandError::UnknownTower(tower));
    };
    let Some(definition) = config.tower(&current.kind) else {
        return Err(CommandError::UnknownTowerKind(current.kind.clone()));
    };
    let Some(price) = definition.upgrades.get(&upgrade).map(|entry| entry.cost) else {
        return Err(CommandError::UnknownUpgrade { tower, upgrade });
    };
    if current.has_upgrade(&upgrade) {
        return Err(CommandError::DuplicateUpgrade { tower, upgrade });
    }
    world.spend(price)?;

    if let Some(current) = world.towers.get_mut(tower) {
        current.upgrades.push(upgrade.clone());
        current.invested = current.invested.saturating_add(price);
        let modifiers = current
            .upgrades
            .iter()
            .filter_map(|owned| definition.upgrades.get(owned))
            .flat_map(|entry| entry.modifiers.iter());
        current.stats = definition.stats.with_modifiers(modifiers);
    }
    debug!("tower {tower} upgraded with {upgrade} for {price}");

    Ok(Event::TowerUpgraded {
        tower,
        upgrade,
        cost: price,
    })
}

/// Share of `invested` returned on sale, rounded down.
pub(crate) fn refund(invested: u32, percent: u32) -> u32 {
    let refund = u64::from(invested) * u64::from(percent.min(100)) / 100;
    u32::try_from(refund).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_rounds_down() {
        assert_eq!(refund(100, 70), 70);
        assert_eq!(refund(75, 70), 52);
        assert_eq!(refund(1, 50), 0);
    }

    #[test]
    fn refund_never_exceeds_investment() {
        assert_eq!(refund(80, 250), 80);
    }
}
