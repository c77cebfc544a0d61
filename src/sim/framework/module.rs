use anyhow::Result;

use super::{Bus, SimContext};

/// One pass of a simulation step.
///
/// Modules read their inputs from the [`Bus`] and publish their outputs back
/// to it; they never talk to each other directly.
pub trait SimModule {
    /// Human-readable identifier for debugging / logging.
    fn name(&self) -> &'static str;

    /// Optional one-time initialization hook.
    fn init(&mut self, _ctx: &SimContext, _bus: &mut Bus) -> Result<()> {
        Ok(())
    }

    /// Advances the module by one step.
    fn step(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::room::RoomGeometry;
    use crate::sim::index::ZoneIndex;

    struct Dummy;
    impl SimModule for Dummy {
        fn name(&self) -> &'static str {
            "dummy"
        }

        fn step(&mut self, _ctx: &SimContext, bus: &mut Bus) -> Result<()> {
            bus.put(42_u32);
            Ok(())
        }
    }

    #[test]
    fn test_default_init_is_ok() {
        let room = RoomGeometry::new(1.0, 4, &[], 3).unwrap();
        let index = ZoneIndex::new(&room);
        let ctx = SimContext::new(&room, &index, 0.1);

        let mut bus = Bus::new();
        let mut m = Dummy;

        m.init(&ctx, &mut bus).unwrap();
        m.step(&ctx, &mut bus).unwrap();
        assert_eq!(bus.get::<u32>(), Some(&42));
    }
}
