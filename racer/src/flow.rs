use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    InGame,
    Highscores,
    Options,
    Exit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    StartRace,
    ShowHighscores,
    ShowOptions,
    RaceFinished,
    Back,
    Quit,
}

/// The whole transition table. None means the event means nothing on that screen.
pub fn transition(screen: Screen, event: FlowEvent) -> Option<Screen> {
    use self::FlowEvent::*;
    use self::Screen::*;

    match (screen, event) {
        (Exit, _) => None,
        (_, Quit) => Some(Exit),

        (MainMenu, StartRace) => Some(InGame),
        (MainMenu, ShowHighscores) => Some(Highscores),
        (MainMenu, ShowOptions) => Some(Options),
        (MainMenu, Back) => Some(Exit),

        (InGame, RaceFinished) => Some(Highscores),
        (InGame, Back) => Some(MainMenu),

        (Highscores, StartRace) => Some(InGame),
        (Highscores, Back) => Some(MainMenu),

        (Options, Back) => Some(MainMenu),

        _ => None,
    }
}

/// Which screen the game is on. Starts at the main menu, ends at `Exit`.
#[derive(Clone, Debug)]
pub struct GameFlow {
    current: Screen,
}

impl Default for GameFlow {
    fn default() -> GameFlow {
        GameFlow {
            current: Screen::MainMenu,
        }
    }
}

impl GameFlow {
    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn is_done(&self) -> bool {
        self.current == Screen::Exit
    }

    /// apply `event`, ignoring it when the current screen has no transition for it
    pub fn handle(&mut self, event: FlowEvent) -> Screen {
        match transition(self.current, event) {
            Some(next) => {
                debug!(from = ?self.current, to = ?next, ?event, "screen change");
                self.current = next;
            }
            None => debug!(screen = ?self.current, ?event, "ignored flow event"),
        }
        self.current
    }
}
