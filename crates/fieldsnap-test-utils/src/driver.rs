//! A reference field driver.

use std::f64::consts::TAU;

use fieldsnap_core::Device;
use fieldsnap_device::StridedView;

/// First-order upwind solver for `u_t + a u_x = 0` on a periodic grid.
///
/// The state holds `cells` interior values plus one ghost cell at each end,
/// so a row is `cells + 2` wide (258 for the default 256-cell grid). The
/// initial condition is a single Gaussian pulse centred in the domain.
#[derive(Clone, Debug)]
pub struct AdvectionDriver {
    u: Vec<f64>,
    courant: f64,
    steps: usize,
}

impl AdvectionDriver {
    /// A grid of `cells` interior cells advanced at Courant number `courant`.
    ///
    /// # Panics
    ///
    /// If `cells` is zero or `courant` is outside `(0, 1]`.
    pub fn new(cells: usize, courant: f64) -> Self {
        assert!(cells > 0, "advection grid needs at least one cell");
        assert!(
            courant > 0.0 && courant <= 1.0,
            "upwind scheme is unstable for courant {courant}"
        );
        let dx = TAU / cells as f64;
        let mut u = vec![0.0; cells + 2];
        for (i, cell) in u[1..=cells].iter_mut().enumerate() {
            let x = i as f64 * dx - TAU / 2.0;
            *cell = (-x * x * 4.0).exp();
        }
        let mut driver = Self {
            u,
            courant,
            steps: 0,
        };
        driver.fill_ghosts();
        driver
    }

    /// The default 256-cell grid at Courant number 0.5.
    pub fn standard() -> Self {
        Self::new(256, 0.5)
    }

    /// Row width including ghost cells.
    pub fn width(&self) -> usize {
        self.u.len()
    }

    /// Timesteps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The current state, ghost cells included.
    pub fn state(&self) -> &[f64] {
        &self.u
    }

    /// Sum of the interior cells. Conserved by the scheme up to rounding.
    pub fn mass(&self) -> f64 {
        self.u[1..self.u.len() - 1].iter().sum()
    }

    /// Advance one timestep.
    pub fn step(&mut self) {
        let previous = self.u.clone();
        let c = self.courant;
        for i in 1..self.u.len() - 1 {
            self.u[i] = previous[i] - c * (previous[i] - previous[i - 1]);
        }
        self.fill_ghosts();
        self.steps += 1;
    }

    /// The state as a 1-D sample tagged as resident on `device`.
    ///
    /// Stands in for a simulation that keeps its field in accelerator memory.
    pub fn view(&self, device: Device) -> StridedView<'_, f64> {
        StridedView::from_slice(&self.u, device)
    }

    fn fill_ghosts(&mut self) {
        let n = self.u.len() - 2;
        self.u[0] = self.u[n];
        self.u[n + 1] = self.u[1];
    }
}
