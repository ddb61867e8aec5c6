//! The chicken and its movement controller.
//!
//! Input arrives as discrete `MoveIntent`s. An accepted intent becomes the
//! single pending move, announced with `MoveStarted`; the animation layer
//! answers with `MoveFinished` carrying the same ticket. Gameplay state only
//! changes when that answer arrives, and intents are dropped while a move is
//! pending, so moves never overlap from the game's point of view.

use bevy::prelude::*;

pub mod gate;

use crate::assets::{models_valid, ModelKey, ModelRegistry};
use crate::game_state::{GameState, Score};
use crate::world::lanes::AdvanceLanes;
use crate::world::vegetation::Obstacle;
use crate::world::{Cell, WorldConfig};
use crate::CrossingSet;
use gate::{apply_probe_contacts, BlockingGate, Probe};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingMove>()
            .add_event::<MoveIntent>()
            .add_event::<MoveStarted>()
            .add_event::<MoveFinished>()
            .add_systems(OnEnter(GameState::Menu), spawn_player.run_if(models_valid))
            .add_systems(OnEnter(GameState::GameOver), begin_death_move)
            .add_systems(Update, apply_probe_contacts.in_set(CrossingSet::Contacts))
            .add_systems(
                Update,
                (handle_intents, complete_move)
                    .chain()
                    .in_set(CrossingSet::Moves),
            );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Left,
    Right,
}

impl MoveDirection {
    pub fn probe(self) -> Probe {
        match self {
            MoveDirection::Forward => Probe::Front,
            MoveDirection::Left => Probe::Left,
            MoveDirection::Right => Probe::Right,
        }
    }

    /// One lattice step in this direction.
    pub fn step(self) -> Cell {
        self.probe().offset()
    }
}

/// Directional intent from the input collaborator.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveIntent(pub MoveDirection);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Step(MoveDirection),
    /// Scripted exit after being run over.
    Death,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveTicket(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveMove {
    pub ticket: MoveTicket,
    pub kind: MoveKind,
    pub from: Cell,
    pub to: Cell,
}

/// A move was accepted; animate it and answer with `MoveFinished`.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveStarted(pub ActiveMove);

/// The animation for a ticket completed.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveFinished {
    pub ticket: MoveTicket,
}

/// The player's single in-flight move, resolved exactly once.
#[derive(Resource, Default, Debug)]
pub struct PendingMove {
    current: Option<ActiveMove>,
    issued: u64,
}

impl PendingMove {
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn current(&self) -> Option<ActiveMove> {
        self.current
    }

    /// Make `kind` the pending move, superseding any move in flight.
    pub fn issue(&mut self, kind: MoveKind, from: Cell, to: Cell) -> ActiveMove {
        self.issued += 1;
        let active = ActiveMove {
            ticket: MoveTicket(self.issued),
            kind,
            from,
            to,
        };
        self.current = Some(active);
        active
    }

    /// Take the pending move if `ticket` is the one in flight.
    pub fn resolve(&mut self, ticket: MoveTicket) -> Option<ActiveMove> {
        match self.current {
            Some(active) if active.ticket == ticket => self.current.take(),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.current = None;
    }
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    /// Committed lattice cell; updated when a move completes.
    pub cell: Cell,
}

fn spawn_player(mut commands: Commands, config: Res<WorldConfig>, models: Res<ModelRegistry>) {
    let cell = config.spawn;
    commands.spawn((
        Player { cell },
        BlockingGate::default(),
        ModelKey::Chicken,
        models.footprint(ModelKey::Chicken),
        Transform::from_translation(cell.to_translation(0.0)),
        Name::new("chicken"),
    ));
}

/// Turn intents into moves. The first intent in the menu starts the run and
/// is executed as a move; intents during game over are dropped.
#[allow(clippy::too_many_arguments)]
fn handle_intents(
    mut intents: EventReader<MoveIntent>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    config: Res<WorldConfig>,
    mut pending: ResMut<PendingMove>,
    players: Query<(&Player, &BlockingGate)>,
    mut started: EventWriter<MoveStarted>,
    mut advance: EventWriter<AdvanceLanes>,
) {
    for &MoveIntent(direction) in intents.read() {
        match state.get() {
            GameState::GameOver => {
                debug!("Ignoring {direction:?} during game over");
                continue;
            }
            GameState::Playing => {
                if matches!(*next_state, NextState::Pending(GameState::GameOver)) {
                    continue;
                }
            }
            GameState::Menu => {
                if !matches!(*next_state, NextState::Pending(GameState::Playing)) {
                    info!("Run started");
                    next_state.set(GameState::Playing);
                }
            }
        }

        let Ok((player, gate)) = players.get_single() else {
            continue;
        };
        if !pending.is_idle() {
            debug!("Move in flight, dropping {direction:?}");
            continue;
        }

        let target = player.cell.offset(direction.step());
        if !gate.can_move(direction.probe()) || !config.in_bounds(target.x) {
            debug!("Move {direction:?} from {:?} refused", player.cell);
            continue;
        }

        let active = pending.issue(MoveKind::Step(direction), player.cell, target);
        started.send(MoveStarted(active));
        if direction == MoveDirection::Forward {
            advance.send(AdvanceLanes);
        }
    }
}

/// Resolve finished moves: commit the cell, recheck the probes, score
/// forward hops, and leave game over once the death move is done.
fn complete_move(
    mut finished: EventReader<MoveFinished>,
    mut pending: ResMut<PendingMove>,
    mut players: Query<(&mut Player, &mut BlockingGate, &mut Transform)>,
    obstacles: Query<&Obstacle>,
    mut score: ResMut<Score>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for finished in finished.read() {
        let Some(active) = pending.resolve(finished.ticket) else {
            debug!("Stale move completion {:?}", finished.ticket);
            continue;
        };

        match active.kind {
            MoveKind::Step(direction) => {
                if let Ok((mut player, mut gate, mut transform)) = players.get_single_mut() {
                    player.cell = active.to;
                    transform.translation.x = active.to.x as f32;
                    transform.translation.z = active.to.z as f32;
                    gate.recheck(active.to, |cell| {
                        obstacles.iter().any(|obstacle| obstacle.cell == cell)
                    });
                }
                if direction == MoveDirection::Forward {
                    score.0 += 1;
                }
            }
            MoveKind::Death => {
                info!("Resetting world");
                next_state.set(GameState::Menu);
            }
        }
    }
}

/// Drop pending input and whatever move was in flight, then play the exit.
fn begin_death_move(
    mut intents: ResMut<Events<MoveIntent>>,
    mut pending: ResMut<PendingMove>,
    players: Query<&Player>,
    mut started: EventWriter<MoveStarted>,
) {
    intents.clear();
    pending.cancel();

    let cell = players
        .get_single()
        .map(|player| player.cell)
        .unwrap_or_default();
    let active = pending.issue(MoveKind::Death, cell, cell);
    started.send(MoveStarted(active));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{Category, ContactEvent};
    use crate::testing::{bare_grass, finish_move, headless_app, headless_app_with, hop, swipe};

    fn player(app: &mut App) -> (Player, BlockingGate) {
        let world = app.world_mut();
        let (player, gate) = world.query::<(&Player, &BlockingGate)>().single(world);
        (*player, gate.clone())
    }

    fn send_contact(app: &mut App, a: Category, b: Category) {
        app.world_mut().send_event(ContactEvent::new(a, b));
        app.update();
    }

    #[test]
    fn tickets_resolve_exactly_once() {
        let mut pending = PendingMove::default();
        let first = pending.issue(
            MoveKind::Step(MoveDirection::Left),
            Cell::new(0, 0),
            Cell::new(-1, 0),
        );
        assert_eq!(pending.resolve(MoveTicket(99)), None);
        assert_eq!(pending.resolve(first.ticket), Some(first));
        assert_eq!(pending.resolve(first.ticket), None);
        assert!(pending.is_idle());
    }

    #[test]
    fn superseded_ticket_is_stale() {
        let mut pending = PendingMove::default();
        let step = pending.issue(
            MoveKind::Step(MoveDirection::Forward),
            Cell::new(0, 0),
            Cell::new(0, -1),
        );
        let death = pending.issue(MoveKind::Death, Cell::new(0, 0), Cell::new(0, 0));
        assert_eq!(pending.resolve(step.ticket), None);
        assert_eq!(pending.resolve(death.ticket), Some(death));
    }

    #[test]
    fn first_swipe_starts_the_run_and_scores() {
        let mut app = headless_app(42);
        assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::Menu);

        assert!(swipe(&mut app, MoveDirection::Forward));
        finish_move(&mut app);

        assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::Playing);
        assert_eq!(app.world().resource::<Score>().0, 1);
        assert_eq!(player(&mut app).0.cell, Cell::new(0, -1));
    }

    #[test]
    fn score_counts_forward_hops_only() {
        let mut app = headless_app_with(8, bare_grass());
        let mut forward = 0;
        for direction in [
            MoveDirection::Forward,
            MoveDirection::Left,
            MoveDirection::Forward,
            MoveDirection::Right,
            MoveDirection::Right,
            MoveDirection::Forward,
        ] {
            if hop(&mut app, direction) && direction == MoveDirection::Forward {
                forward += 1;
            }
        }
        assert_eq!(forward, 3);
        assert_eq!(app.world().resource::<Score>().0, forward);
        assert_eq!(player(&mut app).0.cell, Cell::new(1, -3));
    }

    #[test]
    fn right_edge_is_a_wall() {
        let mut app = headless_app_with(4, bare_grass());
        for _ in 0..10 {
            assert!(hop(&mut app, MoveDirection::Right));
        }
        assert_eq!(player(&mut app).0.cell, Cell::new(10, 0));

        assert!(!swipe(&mut app, MoveDirection::Right));
        assert_eq!(player(&mut app).0.cell, Cell::new(10, 0));
        assert_eq!(app.world().resource::<Score>().0, 0);
    }

    #[test]
    fn intents_are_dropped_while_a_move_is_pending() {
        let mut app = headless_app_with(4, bare_grass());
        assert!(swipe(&mut app, MoveDirection::Forward));
        let ticket = app.world().resource::<PendingMove>().current().unwrap().ticket;

        app.world_mut().send_event(MoveIntent(MoveDirection::Left));
        app.update();
        assert_eq!(
            app.world().resource::<PendingMove>().current().map(|mv| mv.ticket),
            Some(ticket)
        );

        finish_move(&mut app);
        assert_eq!(player(&mut app).0.cell, Cell::new(0, -1));
        assert!(app.world().resource::<PendingMove>().is_idle());
    }

    #[test]
    fn vegetation_contact_blocks_until_recheck_clears() {
        let mut app = headless_app_with(12, bare_grass());
        assert!(hop(&mut app, MoveDirection::Forward));

        send_contact(&mut app, Category::Vegetation, Category::Probe(Probe::Front));
        assert!(!player(&mut app).1.can_move(Probe::Front));
        assert!(!swipe(&mut app, MoveDirection::Forward));

        // Sideways is still open; after that hop nothing is ahead any more.
        assert!(hop(&mut app, MoveDirection::Left));
        assert!(player(&mut app).1.can_move(Probe::Front));
        assert!(hop(&mut app, MoveDirection::Forward));
        assert_eq!(app.world().resource::<Score>().0, 2);
    }

    #[test]
    fn recheck_keeps_probe_closed_over_real_vegetation() {
        use crate::world::vegetation::VegetationKind;

        let mut app = headless_app_with(12, bare_grass());
        assert!(hop(&mut app, MoveDirection::Forward));

        for x in [0, 1] {
            app.world_mut().spawn(Obstacle {
                kind: VegetationKind::Hedge,
                cell: Cell::new(x, -2),
            });
        }
        send_contact(&mut app, Category::Vegetation, Category::Probe(Probe::Front));

        // Still a hedge in front after one step right.
        assert!(hop(&mut app, MoveDirection::Right));
        assert!(player(&mut app).1.is_blocked(Probe::Front));
        assert!(!swipe(&mut app, MoveDirection::Forward));

        assert!(hop(&mut app, MoveDirection::Right));
        assert!(player(&mut app).1.can_move(Probe::Front));
        assert!(hop(&mut app, MoveDirection::Forward));
        assert_eq!(player(&mut app).0.cell, Cell::new(2, -2));
    }

    #[test]
    fn unknown_contacts_change_nothing() {
        let mut app = headless_app(6);
        assert!(hop(&mut app, MoveDirection::Forward));
        let before = player(&mut app);

        send_contact(&mut app, Category::Vehicle, Category::Vegetation);
        send_contact(&mut app, Category::Probe(Probe::Left), Category::Chicken);

        assert_eq!(player(&mut app), before);
        assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::Playing);
    }
}
