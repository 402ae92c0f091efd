//! Keyboard bindings
//!
//! Maps raw key identifiers (browser `KeyboardEvent.key` strings) to logical
//! per-player actions. The simulation only ever reads [`InputState`]; key
//! events mutate it between ticks.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Player;

/// Physical keyboard layout preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyLayout {
    #[default]
    Qwerty,
    Azerty,
}

impl KeyLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyLayout::Qwerty => "qwerty",
            KeyLayout::Azerty => "azerty",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "qwerty" => Some(KeyLayout::Qwerty),
            "azerty" => Some(KeyLayout::Azerty),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            KeyLayout::Qwerty => KeyLayout::Azerty,
            KeyLayout::Azerty => KeyLayout::Qwerty,
        }
    }
}

/// Logical action a player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Dash / confirm button
    Confirm,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Confirm,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
            Action::Confirm => 4,
        }
    }
}

/// Raw key identifiers for one player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerKeys {
    pub up: &'static str,
    pub down: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    pub confirm: &'static str,
}

impl PlayerKeys {
    pub fn key_for(&self, action: Action) -> &'static str {
        match action {
            Action::Up => self.up,
            Action::Down => self.down,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Confirm => self.confirm,
        }
    }

    fn lookup(&self, key: &str) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|&action| keys_match(self.key_for(action), key))
    }
}

const ARROW_KEYS: PlayerKeys = PlayerKeys {
    up: "ArrowUp",
    down: "ArrowDown",
    left: "ArrowLeft",
    right: "ArrowRight",
    confirm: "Control",
};

/// Action → key table for both player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingTable {
    pub players: [PlayerKeys; 2],
}

impl BindingTable {
    pub fn keys(&self, player: Player) -> &PlayerKeys {
        &self.players[player.index()]
    }

    /// Action bound to `key` for `player`, if any
    pub fn lookup(&self, player: Player, key: &str) -> Option<Action> {
        self.keys(player).lookup(key)
    }
}

/// Build the binding table for a layout preset
pub fn bind(layout: KeyLayout) -> BindingTable {
    let player_one = match layout {
        KeyLayout::Qwerty => PlayerKeys {
            up: "w",
            down: "s",
            left: "a",
            right: "d",
            confirm: "Shift",
        },
        KeyLayout::Azerty => PlayerKeys {
            up: "z",
            down: "s",
            left: "q",
            right: "d",
            confirm: "Shift",
        },
    };
    BindingTable {
        players: [player_one, ARROW_KEYS],
    }
}

/// Single-character keys match regardless of case (caps lock, shift held)
fn keys_match(bound: &str, key: &str) -> bool {
    if bound.chars().count() == 1 && key.chars().count() == 1 {
        bound.eq_ignore_ascii_case(key)
    } else {
        bound == key
    }
}

fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// Host restart key (`r` / `R`)
pub fn is_restart_key(key: &str) -> bool {
    keys_match("r", key)
}

/// Whether a raw event is a press or a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyPhase {
    Down,
    Up,
}

/// Raw key event delivered by the host
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent<'a> {
    pub key: &'a str,
    pub phase: KeyPhase,
    /// Host timestamp in milliseconds (informational)
    pub timestamp: f64,
}

impl<'a> KeyEvent<'a> {
    pub fn down(key: &'a str) -> Self {
        Self {
            key,
            phase: KeyPhase::Down,
            timestamp: 0.0,
        }
    }

    pub fn up(key: &'a str) -> Self {
        Self {
            key,
            phase: KeyPhase::Up,
            timestamp: 0.0,
        }
    }
}

/// One resolved binding for a raw event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub player: Player,
    pub action: Action,
    pub pressed: bool,
}

/// Held/edge state per player per action (last writer wins)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    held: [[bool; 5]; 2],
    /// Presses not yet consumed by a tick
    pressed: [[bool; 5]; 2],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, player: Player, action: Action, down: bool) {
        let slot = &mut self.held[player.index()][action.index()];
        if down && !*slot {
            self.pressed[player.index()][action.index()] = true;
        }
        *slot = down;
    }

    #[inline]
    pub fn is_down(&self, player: Player, action: Action) -> bool {
        self.held[player.index()][action.index()]
    }

    /// Consume a press edge (true once per physical press)
    pub fn take_press(&mut self, player: Player, action: Action) -> bool {
        std::mem::take(&mut self.pressed[player.index()][action.index()])
    }

    /// Drop press edges nobody consumed this tick
    pub fn end_tick(&mut self) {
        self.pressed = [[false; 5]; 2];
    }

    /// Movement direction from the four direction keys (screen space, +y down)
    pub fn axis(&self, player: Player) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.is_down(player, Action::Up) {
            dir.y -= 1.0;
        }
        if self.is_down(player, Action::Down) {
            dir.y += 1.0;
        }
        if self.is_down(player, Action::Left) {
            dir.x -= 1.0;
        }
        if self.is_down(player, Action::Right) {
            dir.x += 1.0;
        }
        dir
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Active layout plus the bindings each currently-held key was pressed under
#[derive(Debug, Clone)]
pub struct InputBinding {
    layout: KeyLayout,
    table: BindingTable,
    held: HashMap<String, Vec<(Player, Action)>>,
}

impl Default for InputBinding {
    fn default() -> Self {
        Self::new(KeyLayout::default())
    }
}

impl InputBinding {
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            layout,
            table: bind(layout),
            held: HashMap::new(),
        }
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Switch layout; applies from the next poll. Keys already held keep the
    /// binding they were pressed under until released.
    pub fn select_layout(&mut self, layout: KeyLayout) {
        if layout == self.layout {
            return;
        }
        log::info!("Key layout: {}", layout.as_str());
        self.layout = layout;
        self.table = bind(layout);
    }

    /// Resolve a raw key event and apply it to `state`.
    ///
    /// Yields at most one binding per player; the same key may drive both
    /// players when both tables bind it.
    pub fn poll(&mut self, event: &KeyEvent<'_>, state: &mut InputState) -> Vec<Resolved> {
        let key = normalize_key(event.key);
        let resolved: Vec<Resolved> = match event.phase {
            KeyPhase::Down => {
                let bindings: Vec<(Player, Action)> = Player::ALL
                    .into_iter()
                    .filter_map(|p| self.table.lookup(p, event.key).map(|a| (p, a)))
                    .collect();
                if bindings.is_empty() {
                    return Vec::new();
                }
                self.held.insert(key, bindings.clone());
                bindings
                    .into_iter()
                    .map(|(player, action)| Resolved {
                        player,
                        action,
                        pressed: true,
                    })
                    .collect()
            }
            KeyPhase::Up => match self.held.remove(&key) {
                Some(bindings) => bindings
                    .into_iter()
                    .map(|(player, action)| Resolved {
                        player,
                        action,
                        pressed: false,
                    })
                    .collect(),
                None => Player::ALL
                    .into_iter()
                    .filter_map(|player| {
                        self.table.lookup(player, event.key).map(|action| Resolved {
                            player,
                            action,
                            pressed: false,
                        })
                    })
                    .collect(),
            },
        };

        for r in &resolved {
            state.set(r.player, r.action, r.pressed);
        }
        resolved
    }

    /// Release everything (window blur, mode change)
    pub fn release_all(&mut self, state: &mut InputState) {
        self.held.clear();
        state.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qwerty_and_azerty_tables() {
        let qwerty = bind(KeyLayout::Qwerty);
        assert_eq!(qwerty.lookup(Player::One, "w"), Some(Action::Up));
        assert_eq!(qwerty.lookup(Player::One, "a"), Some(Action::Left));
        assert_eq!(qwerty.lookup(Player::Two, "ArrowLeft"), Some(Action::Left));
        assert_eq!(qwerty.lookup(Player::Two, "Control"), Some(Action::Confirm));

        let azerty = bind(KeyLayout::Azerty);
        assert_eq!(azerty.lookup(Player::One, "z"), Some(Action::Up));
        assert_eq!(azerty.lookup(Player::One, "q"), Some(Action::Left));
        assert_eq!(azerty.lookup(Player::One, "w"), None);
    }

    #[test]
    fn test_case_insensitive_letters() {
        let table = bind(KeyLayout::Qwerty);
        assert_eq!(table.lookup(Player::One, "W"), Some(Action::Up));
        // Named keys are exact
        assert_eq!(table.lookup(Player::One, "shift"), None);
        assert!(is_restart_key("R"));
        assert!(!is_restart_key("Return"));
    }

    #[test]
    fn test_poll_updates_state() {
        let mut binding = InputBinding::new(KeyLayout::Qwerty);
        let mut state = InputState::new();

        let resolved = binding.poll(&KeyEvent::down("d"), &mut state);
        assert_eq!(
            resolved,
            vec![Resolved {
                player: Player::One,
                action: Action::Right,
                pressed: true
            }]
        );
        assert!(state.is_down(Player::One, Action::Right));
        assert_eq!(state.axis(Player::One), Vec2::new(1.0, 0.0));

        binding.poll(&KeyEvent::up("D"), &mut state);
        assert!(!state.is_down(Player::One, Action::Right));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut binding = InputBinding::default();
        let mut state = InputState::new();
        assert!(binding.poll(&KeyEvent::down("F13"), &mut state).is_empty());
        assert_eq!(state, InputState::new());
    }

    #[test]
    fn test_layout_switch_keeps_held_key_binding() {
        let mut binding = InputBinding::new(KeyLayout::Qwerty);
        let mut state = InputState::new();

        binding.poll(&KeyEvent::down("a"), &mut state);
        assert!(state.is_down(Player::One, Action::Left));

        binding.select_layout(KeyLayout::Azerty);
        // "a" is unbound in azerty, but its release must still clear Left
        binding.poll(&KeyEvent::up("a"), &mut state);
        assert!(!state.is_down(Player::One, Action::Left));

        // New presses use the new table
        binding.poll(&KeyEvent::down("q"), &mut state);
        assert!(state.is_down(Player::One, Action::Left));
    }

    #[test]
    fn test_select_layout_is_idempotent() {
        let mut binding = InputBinding::new(KeyLayout::Azerty);
        let before = *binding.table();
        binding.select_layout(KeyLayout::Azerty);
        assert_eq!(*binding.table(), before);
    }

    #[test]
    fn test_press_edge_consumed_once() {
        let mut binding = InputBinding::default();
        let mut state = InputState::new();
        binding.poll(&KeyEvent::down("Shift"), &mut state);
        // Auto-repeat keydown must not create a second edge
        binding.poll(&KeyEvent::down("Shift"), &mut state);
        assert!(state.take_press(Player::One, Action::Confirm));
        assert!(!state.take_press(Player::One, Action::Confirm));
        assert!(state.is_down(Player::One, Action::Confirm));
    }
}
