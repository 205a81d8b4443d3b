use joyrun_assets::AssetLoader;
use joyrun_common::CharacterVariant;
use joyrun_input::{Action, InputHandle, InputQueue};
use joyrun_kernel::{GameEvent, GameSession, GameStatus};
use joyrun_render::{CharacterRig, ObstacleVisuals, PoseInput, RenderView, Scene};
use tracing::{debug, info};

/// The running game: one session, its visuals, and the loop that ties them.
///
/// The owner calls [`GameApp::frame`] once per display refresh. Each frame
/// settles finished loads, applies queued input, advances the session, mirrors
/// its events into the scene, poses the character and renders. After
/// [`GameApp::shutdown`] frames do nothing.
pub struct GameApp<S: Scene, L: AssetLoader> {
    session: GameSession,
    scene: S,
    loader: L,
    rig: CharacterRig,
    obstacles: ObstacleVisuals,
    input: InputQueue,
    view: RenderView,
    frame_events: Vec<GameEvent>,
    frames: u64,
    shut_down: bool,
}

impl<S: Scene, L: AssetLoader> GameApp<S, L> {
    /// Wire up `session` and request the selected character's model.
    pub fn new(session: GameSession, scene: S, mut loader: L) -> Self {
        let mut rig = CharacterRig::new(session.config());
        rig.request_load(session.selected_character(), &mut loader);
        Self {
            session,
            scene,
            loader,
            rig,
            obstacles: ObstacleVisuals::new(),
            input: InputQueue::new(),
            view: RenderView::default(),
            frame_events: Vec::new(),
            frames: 0,
            shut_down: false,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    pub fn rig(&self) -> &CharacterRig {
        &self.rig
    }

    pub fn obstacle_visuals(&self) -> &ObstacleVisuals {
        &self.obstacles
    }

    pub fn view_mut(&mut self) -> &mut RenderView {
        &mut self.view
    }

    /// Producer for actions delivered from outside the frame loop.
    pub fn input_handle(&self) -> InputHandle {
        self.input.handle()
    }

    /// Session events drained during the last frame.
    pub fn frame_events(&self) -> &[GameEvent] {
        &self.frame_events
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Run one frame. `elapsed` is seconds since start and drives cosmetic
    /// animation only. Returns `None` once shut down.
    pub fn frame(&mut self, elapsed: f32) -> Option<S::Frame> {
        if self.shut_down {
            return None;
        }
        self.frames += 1;

        for completion in self.loader.drain_completed() {
            if let Some(settled) = self.rig.settle(completion, &mut self.scene) {
                debug!(token = settled.token.0, variant = %settled.variant, attached = settled.attached, "Character load settled");
                self.session.mark_loaded();
            }
        }

        for action in self.input.drain() {
            self.apply(action);
        }

        self.session.tick();

        self.frame_events = self.session.drain_events();
        self.obstacles.apply(&self.frame_events, &mut self.scene);
        self.obstacles.update(self.session.obstacles(), &mut self.scene);

        let body = self.session.body();
        let input = PoseInput {
            playing: self.session.status() == GameStatus::Playing,
            vertical: body.vertical_position(),
            airborne: body.is_airborne(),
            ducking: self.session.is_ducking(),
            bob: body.run_bob(elapsed, self.session.config()),
            elapsed,
        };
        if let Some(pose) = self.rig.pose(input) {
            self.scene.set_transform(pose.handle, &pose.transform);
        }

        self.view.ground_scroll = self.session.ground_scroll();
        Some(self.scene.render(&self.view))
    }

    /// Apply an action right away.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SelectCharacter(variant) => {
                self.select_character(variant);
            }
            Action::StartGame => {
                self.start_game();
            }
            Action::Restart => {
                self.restart();
            }
            Action::Jump => {
                self.jump();
            }
            Action::SetDucking(ducking) => self.set_ducking(ducking),
        }
    }

    /// Select a character and, if the session accepts, load its model.
    pub fn select_character(&mut self, variant: CharacterVariant) -> bool {
        if self.shut_down || !self.session.select_character(variant) {
            return false;
        }
        self.rig.request_load(variant, &mut self.loader);
        true
    }

    pub fn start_game(&mut self) -> bool {
        !self.shut_down && self.session.start_game()
    }

    pub fn restart(&mut self) -> bool {
        !self.shut_down && self.session.restart()
    }

    pub fn jump(&mut self) -> bool {
        !self.shut_down && self.session.jump()
    }

    pub fn set_ducking(&mut self, ducking: bool) {
        if !self.shut_down {
            self.session.set_ducking(ducking);
        }
    }

    /// Stop frames and release every visual and the render surface, whatever
    /// state the session or any pending load is in.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.obstacles.teardown(&mut self.scene);
        self.rig.teardown(&mut self.scene);
        self.scene.release_surface();
        info!(frames = self.frames, status = %self.session.status(), "Game shut down");
    }
}

impl<S: Scene + std::fmt::Debug, L: AssetLoader + std::fmt::Debug> std::fmt::Debug for GameApp<S, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameApp")
            .field("session", &self.session)
            .field("scene", &self.scene)
            .field("loader", &self.loader)
            .field("frames", &self.frames)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}
