use anyhow::Result;

use crate::sim::framework::{Bus, SimContext, SimModule};

use super::boundary::BoundaryEnforcer;
use super::field::Field;
use super::solver::DiffusionStepper;

/// Advances the [`Field`] on the Bus by one explicit diffusion step.
pub struct DiffusionModule {
    stepper: DiffusionStepper,
}

impl DiffusionModule {
    pub fn new(stepper: DiffusionStepper) -> Self {
        Self { stepper }
    }
}

impl SimModule for DiffusionModule {
    fn name(&self) -> &'static str {
        "diffusion"
    }

    fn init(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        let field = bus.require::<Field>(self.name())?;
        anyhow::ensure!(
            field.nodes() == ctx.room.nodes,
            "DiffusionModule: field has {} nodes, room has {}",
            field.nodes(),
            ctx.room.nodes
        );
        anyhow::ensure!(
            (self.stepper.dt() - ctx.dt).abs() <= f64::EPSILON * ctx.dt,
            "DiffusionModule: stepper dt {} differs from context dt {}",
            self.stepper.dt(),
            ctx.dt
        );
        Ok(())
    }

    fn step(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        let field = bus.require_mut::<Field>(self.name())?;
        *field = self.stepper.step(field, ctx.index);
        Ok(())
    }
}

/// Applies border insulation, wall relaxation and window clamping to the
/// [`Field`] on the Bus.
pub struct BoundaryModule {
    enforcer: BoundaryEnforcer,
}

impl BoundaryModule {
    pub fn new(enforcer: BoundaryEnforcer) -> Self {
        Self { enforcer }
    }
}

impl SimModule for BoundaryModule {
    fn name(&self) -> &'static str {
        "boundary"
    }

    fn step(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        let field = bus.require_mut::<Field>(self.name())?;
        let stepped = std::mem::replace(field, Field::uniform(0, 0.0));
        *field = self.enforcer.apply(stepped, ctx.room);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::room::RoomGeometry;
    use crate::geom::zone::{Extent, ZoneKind, ZonePlacement};
    use crate::sim::framework::Pipeline;
    use crate::sim::index::ZoneIndex;

    #[test]
    fn test_diffusion_then_boundary() -> Result<()> {
        let placements = vec![ZonePlacement::new(
            ZoneKind::Window,
            "win",
            Extent::indices(0, 1),
            Extent::indices(2, 4),
        )];
        let room = RoomGeometry::new(1.0, 6, &placements, 3)?;
        let index = ZoneIndex::new(&room);
        let stepper = DiffusionStepper::new(0.025, room.spacing, None, -10.0)?;
        let ctx = SimContext::new(&room, &index, stepper.dt());

        let mut bus = Bus::new();
        let mut start = Field::uniform(6, 20.0);
        start.set(3, 3, 40.0);
        bus.put(start);

        let mut pipeline = Pipeline::new()
            .with_module(DiffusionModule::new(stepper))
            .with_module(BoundaryModule::new(BoundaryEnforcer::new(-10.0)));
        pipeline.init(&ctx, &mut bus)?;
        pipeline.step(&ctx, &mut bus)?;

        let f = bus.require::<Field>("test")?;
        assert_eq!(f.get(0, 2), -10.0);
        assert_eq!(f.get(0, 3), -10.0);
        assert!(f.get(3, 3) < 40.0);
        assert!(f.get(2, 3) > 20.0);
        assert_eq!(f.get(5, 3), f.get(4, 3));
        Ok(())
    }

    #[test]
    fn test_init_rejects_mismatched_field() -> Result<()> {
        let room = RoomGeometry::new(1.0, 6, &[], 3)?;
        let index = ZoneIndex::new(&room);
        let stepper = DiffusionStepper::new(0.025, room.spacing, None, -10.0)?;
        let ctx = SimContext::new(&room, &index, stepper.dt());

        let mut bus = Bus::new();
        bus.put(Field::uniform(5, 20.0));
        let mut module = DiffusionModule::new(stepper);
        assert!(module.init(&ctx, &mut bus).is_err());
        Ok(())
    }
}
