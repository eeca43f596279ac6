use bevy::prelude::*;
use rand::SeedableRng;
use rand_core::RngCore;
use rand_pcg::Pcg64Mcg;

pub struct RngPlugin;
impl Plugin for RngPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GlobalRng::default());
    }
}

/// Seeded process-wide generator so runs of the same build are reproducible.
#[derive(Resource)]
pub struct GlobalRng(pub Pcg64Mcg);

impl Default for GlobalRng {
    fn default() -> Self {
        GlobalRng(Pcg64Mcg::seed_from_u64(12345))
    }
}

impl RngCore for GlobalRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
}
