//! Scales mapping data values to canvas coordinates.

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Creates a scale whose domain is widened to the enclosing nice ticks.
    pub fn nice(domain: (f64, f64), range: (f64, f64), tick_count: usize) -> Self {
        let ticks = nice_ticks(domain.0, domain.1, tick_count);
        match (ticks.first(), ticks.last()) {
            (Some(first), Some(last)) if ticks.len() >= 2 => Self::new((*first, *last), range),
            _ => Self::new(domain, range),
        }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// The domain in data units.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns "nice-ish" tick values for the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
            .into_iter()
            .filter(|t| *t >= self.domain.0.min(self.domain.1) - 1e-9)
            .filter(|t| *t <= self.domain.0.max(self.domain.1) + 1e-9)
            .collect()
    }
}

/// A discrete band scale for categorical axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding: f64,
}

impl ScaleBand {
    /// `padding` is the fraction of each step left empty between bands.
    pub fn new(range: (f64, f64), count: usize, padding: f64) -> Self {
        Self {
            range,
            count,
            padding: padding.clamp(0.0, 0.95),
        }
    }

    fn step(&self) -> f64 {
        (self.range.1 - self.range.0) / self.count.max(1) as f64
    }

    /// Width of one band.
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start coordinate of band `i`.
    pub fn start(&self, i: usize) -> f64 {
        self.range.0 + self.step() * i as f64 + self.step() * self.padding / 2.0
    }

    /// Centre coordinate of band `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.start(i) + self.bandwidth() / 2.0
    }
}

pub(crate) fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return vec![min];
    }
    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    let span = max - min;
    let step = nice_step(span / count.max(1) as f64);
    if step == 0.0 {
        return vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;

    let n_f = ((stop - start) / step).round();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        n_f.min(10_000.0) as u64
    } else {
        0
    };
    (0..=n).map(|i| start + step * i as f64).collect()
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// Format a tick value without trailing noise.
pub(crate) fn format_tick(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract().abs() < 1e-9 && value.abs() < 1e15 {
        return format!("{}", value.round() as i64);
    }
    let s = format!("{value:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
