//! Logical input actions for a single frame
//!
//! The platform layer maps raw keys/buttons to these actions and samples
//! them once per frame; the simulation only ever sees the result.

/// Fixed set of logical actions the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Sprint,
    Launch,
    MenuUp,
    MenuDown,
    Confirm,
    Cancel,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Sprint,
        Action::Launch,
        Action::MenuUp,
        Action::MenuDown,
        Action::Confirm,
        Action::Cancel,
    ];

    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Compact set of actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet(u16);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    #[inline]
    pub fn contains(self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Action> {
        Action::ALL.into_iter().filter(move |&action| self.contains(action))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::EMPTY;
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// Input sampled for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Actions whose key is currently down
    pub held: ActionSet,
    /// Actions whose key went down this frame
    pub pressed: ActionSet,
}

impl TickInput {
    /// Mark an action as held down
    pub fn hold(mut self, action: Action) -> Self {
        self.held.insert(action);
        self
    }

    /// Mark an action as pressed this frame (also held)
    pub fn press(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self.held.insert(action);
        self
    }

    #[inline]
    pub fn is_down(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    #[inline]
    pub fn just_pressed(&self, action: Action) -> bool {
        self.pressed.contains(action)
    }

    /// Horizontal intent: -1 left, +1 right, 0 when neither or both
    pub fn horizontal_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_down(Action::MoveLeft) {
            axis -= 1.0;
        }
        if self.is_down(Action::MoveRight) {
            axis += 1.0;
        }
        axis
    }

    /// Derive next frame's input from the keys held now, given the keys
    /// held last frame
    pub fn from_held(previous: ActionSet, held: ActionSet) -> Self {
        let pressed = held.iter().filter(|&a| !previous.contains(a)).collect();
        Self { held, pressed }
    }
}
