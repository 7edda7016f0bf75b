//! Page placement and pickup

use crate::component::Component;
use crate::config::PageConfig;
use crate::error::Result;
use crate::scene::{EntityId, Scene, Transform};
use glam::Vec3;
use pines_ai::PlayerState;
use pines_physics::{PhysicsWorld, StaticBodyHandle};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone)]
struct PageEntry {
    entity: EntityId,
    position: Vec3,
    body: Option<StaticBodyHandle>,
}

/// The pages of one session
#[derive(Debug)]
pub struct PageSystem {
    config: PageConfig,
    pages: Vec<PageEntry>,
    total: u32,
    collected: u32,
}

impl PageSystem {
    /// A session without pages; never reports all collected
    pub fn empty(config: PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            total: 0,
            collected: 0,
        }
    }

    /// Spawn up to `total_pages` pages at a shuffled subset of `spawn_points`
    pub fn spawn<R: Rng + ?Sized>(
        config: PageConfig,
        scene: &mut Scene,
        physics: &mut PhysicsWorld,
        spawn_points: &[Vec3],
        total_pages: u32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut points = spawn_points.to_vec();
        points.shuffle(rng);

        let wanted = total_pages as usize;
        if points.len() < wanted {
            log::warn!(
                "Only {} page spawn points for {} pages; spawning {}",
                points.len(),
                total_pages,
                points.len()
            );
        }
        points.truncate(wanted);

        let mut pages = Vec::with_capacity(points.len());
        for (index, position) in points.into_iter().enumerate() {
            let entity = scene.spawn(format!("Page_{index}"), Transform::at(position), vec![Component::Page]);
            let body = physics.add_static_sphere(position, config.pickup_radius, entity.tag())?;
            pages.push(PageEntry {
                entity,
                position,
                body: Some(body),
            });
        }
        physics.sync_query_pipeline();

        log::info!("Spawned {} pages", pages.len());
        Ok(Self {
            config,
            total: pages.len() as u32,
            pages,
            collected: 0,
        })
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Pages in play at session start
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    /// Win condition
    pub fn all_collected(&self) -> bool {
        self.total > 0 && self.collected >= self.total
    }

    /// Positions of pages still waiting to be picked up
    pub fn remaining(&self) -> impl Iterator<Item = (EntityId, Vec3)> + '_ {
        self.pages
            .iter()
            .filter(|p| p.body.is_some())
            .map(|p| (p.entity, p.position))
    }

    /// Cast the interaction ray and collect the page it hits first.
    ///
    /// The closest hit must be the page itself, so geometry between the eye
    /// and a page blocks the pickup. Returns the collected page.
    pub fn try_interact(
        &mut self,
        physics: &mut PhysicsWorld,
        eye: Vec3,
        direction: Vec3,
        player: &mut PlayerState,
    ) -> Option<EntityId> {
        let hit = physics.raycast_toward(eye, direction, self.config.interaction_distance)?;
        let target = EntityId::from_tag(hit.user_data)?;
        let page = self
            .pages
            .iter_mut()
            .find(|p| p.entity == target && p.body.is_some())?;

        if let Some(body) = page.body.take() {
            if let Err(e) = physics.remove_body(body) {
                log::warn!("Page {} body already gone: {}", target, e);
            }
        }

        self.collected += 1;
        player.pages_collected += 1;
        log::info!("Collected page {} ({}/{})", target, self.collected, self.total);
        Some(target)
    }
}
