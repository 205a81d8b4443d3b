use glam::Vec3;
use joyrun_assets::{AssetLoader, LoadCompletion, LoadRequest, LoadToken};
use joyrun_common::{CharacterVariant, ModelFormat, Transform};
use joyrun_kernel::SimConfig;
use tracing::{debug, info, warn};

use crate::scene::{ModelMaterial, Scene, SurfaceMaterial, VisualHandle};

const RUN_PHASE_STEP: f32 = 0.15;
const RUN_TILT: f32 = 0.08;
const SQUASH: Vec3 = Vec3::new(0.7, 0.6, 0.7);
const SQUASH_TILT: f32 = 0.3;
const MESH_METALNESS: f32 = 0.1;
const MESH_ROUGHNESS: f32 = 0.8;

/// Player state the rig needs for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseInput {
    /// Whether a run is in progress; otherwise the idle pose is used.
    pub playing: bool,
    pub vertical: f32,
    pub airborne: bool,
    pub ducking: bool,
    /// Cosmetic running bob, already zero while airborne.
    pub bob: f32,
    /// Seconds since the app started.
    pub elapsed: f32,
}

/// Transform to apply to the rig's visual this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigPose {
    pub handle: VisualHandle,
    pub transform: Transform,
}

/// Outcome of the latest load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSettled {
    pub token: LoadToken,
    pub variant: CharacterVariant,
    /// Whether a visual was attached. Failed loads leave the rig empty.
    pub attached: bool,
}

/// The player character's visual: loading, tinting, posing and disposal.
///
/// Every load request gets a fresh token and only the most recent one may
/// change the visual, so a slow earlier load can never replace a newer
/// selection. At most one visual is attached at any time.
#[derive(Debug)]
pub struct CharacterRig {
    player_x: f32,
    ground_offset: f32,
    idle_bob_amplitude: f32,
    idle_bob_frequency: f32,
    /// Variant of the attached visual.
    variant: CharacterVariant,
    issued: LoadToken,
    awaiting: Option<LoadToken>,
    visual: Option<VisualHandle>,
    run_phase: f32,
}

impl CharacterRig {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            player_x: config.player_x,
            ground_offset: config.ground_offset,
            idle_bob_amplitude: config.idle_bob_amplitude,
            idle_bob_frequency: config.idle_bob_frequency,
            variant: CharacterVariant::default(),
            issued: LoadToken(0),
            awaiting: None,
            visual: None,
            run_phase: 0.0,
        }
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    pub fn variant(&self) -> CharacterVariant {
        self.variant
    }

    /// Token of the load that may still change the visual.
    pub fn awaiting(&self) -> Option<LoadToken> {
        self.awaiting
    }

    pub fn run_phase(&self) -> f32 {
        self.run_phase
    }

    /// Ask `loader` for `variant`'s model. Any earlier outstanding request
    /// becomes stale.
    pub fn request_load(
        &mut self,
        variant: CharacterVariant,
        loader: &mut dyn AssetLoader,
    ) -> LoadToken {
        let profile = variant.profile();
        self.issued = self.issued.next();
        if let Some(stale) = self.awaiting.replace(self.issued) {
            debug!(stale = stale.0, "Superseding outstanding model load");
        }
        loader.submit(LoadRequest {
            token: self.issued,
            variant,
            url: profile.model_path.to_string(),
            format: profile.format,
        });
        debug!(token = self.issued.0, %variant, url = profile.model_path, "Model load requested");
        self.issued
    }

    /// Apply a completed load. Returns `None` for stale completions, whose
    /// data is dropped without ever reaching the scene.
    pub fn settle<S: Scene + ?Sized>(
        &mut self,
        completion: LoadCompletion,
        scene: &mut S,
    ) -> Option<LoadSettled> {
        if self.awaiting != Some(completion.token) {
            debug!(token = completion.token.0, variant = %completion.variant, "Ignoring stale model load");
            return None;
        }
        self.awaiting = None;
        self.remove_visual(scene);

        let attached = match completion.result {
            Ok(model) => {
                let profile = completion.variant.profile();
                let material = match profile.format {
                    ModelFormat::Mesh => ModelMaterial::Replace(SurfaceMaterial {
                        color: profile.tint,
                        metalness: MESH_METALNESS,
                        roughness: MESH_ROUGHNESS,
                    }),
                    ModelFormat::Scene => ModelMaterial::OverrideColor(profile.tint),
                };
                let handle = scene.create_model_visual(&model, material);
                scene.set_transform(
                    handle,
                    &Transform::from_euler(
                        Vec3::ZERO,
                        profile.base_rotation,
                        Vec3::splat(profile.scale),
                    ),
                );
                scene.attach(handle);
                self.visual = Some(handle);
                self.variant = completion.variant;
                self.run_phase = 0.0;
                info!(variant = %completion.variant, content = %model.content_id(), "Character model attached");
                true
            }
            Err(e) => {
                warn!(variant = %completion.variant, error = %e, "Character model unavailable");
                false
            }
        };

        Some(LoadSettled {
            token: completion.token,
            variant: completion.variant,
            attached,
        })
    }

    /// Compute this frame's transform. `None` while no visual is attached.
    pub fn pose(&mut self, input: PoseInput) -> Option<RigPose> {
        let handle = self.visual?;
        let profile = self.variant.profile();
        let base_height = self.ground_offset + profile.vertical_offset;

        let (height, tilt, scale) = if !input.playing {
            let bob = (input.elapsed * self.idle_bob_frequency).sin() * self.idle_bob_amplitude;
            (base_height + bob, 0.0, Vec3::splat(profile.scale))
        } else if input.airborne || input.ducking {
            (
                base_height + input.vertical + input.bob,
                SQUASH_TILT,
                SQUASH * profile.scale,
            )
        } else {
            self.run_phase += RUN_PHASE_STEP;
            (
                base_height + input.vertical + input.bob,
                self.run_phase.sin() * RUN_TILT,
                Vec3::splat(profile.scale),
            )
        };

        Some(RigPose {
            handle,
            transform: Transform::from_euler(
                Vec3::new(self.player_x, height, 0.0),
                profile.base_rotation + Vec3::new(tilt, 0.0, 0.0),
                scale,
            ),
        })
    }

    /// Drop the visual and invalidate any outstanding load.
    pub fn teardown<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        if let Some(token) = self.awaiting.take() {
            debug!(token = token.0, "Outstanding model load abandoned");
        }
        self.remove_visual(scene);
    }

    fn remove_visual<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        if let Some(handle) = self.visual.take() {
            scene.detach(handle);
            scene.dispose(handle);
        }
    }
}
