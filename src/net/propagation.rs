//! 传播时延分布

use rand::Rng;
use rand_distr::{Distribution, Exp, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::sim::SimTime;

/// 路径传播时延（秒）的分布。抽样结果截断到 ≥ 0。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Propagation {
    Constant { secs: f64 },
    Uniform { min_secs: f64, max_secs: f64 },
    Normal { mean_secs: f64, std_dev_secs: f64 },
    Exponential { mean_secs: f64 },
}

impl Default for Propagation {
    fn default() -> Self {
        Propagation::Constant { secs: 0.0 }
    }
}

impl Propagation {
    pub fn constant(delay: SimTime) -> Self {
        Propagation::Constant {
            secs: delay.as_secs_f64(),
        }
    }

    /// 检查参数是否合法
    pub fn validate(&self) -> Result<(), String> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(format!("{name} must be finite, got {v}"))
            }
        };
        match *self {
            Propagation::Constant { secs } => finite("secs", secs),
            Propagation::Uniform { min_secs, max_secs } => {
                finite("min_secs", min_secs)?;
                finite("max_secs", max_secs)?;
                if min_secs > max_secs {
                    return Err(format!("min_secs {min_secs} > max_secs {max_secs}"));
                }
                Ok(())
            }
            Propagation::Normal {
                mean_secs,
                std_dev_secs,
            } => {
                finite("mean_secs", mean_secs)?;
                finite("std_dev_secs", std_dev_secs)?;
                if std_dev_secs < 0.0 {
                    return Err(format!("std_dev_secs {std_dev_secs} < 0"));
                }
                Ok(())
            }
            Propagation::Exponential { mean_secs } => {
                finite("mean_secs", mean_secs)?;
                if mean_secs < 0.0 {
                    return Err(format!("mean_secs {mean_secs} < 0"));
                }
                Ok(())
            }
        }
    }

    /// 抽样一个传播时延
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SimTime {
        let secs = match *self {
            Propagation::Constant { secs } => secs,
            Propagation::Uniform { min_secs, max_secs } => {
                if max_secs > min_secs {
                    Uniform::new(min_secs, max_secs).sample(rng)
                } else {
                    min_secs
                }
            }
            Propagation::Normal {
                mean_secs,
                std_dev_secs,
            } => Normal::new(mean_secs, std_dev_secs)
                .map(|d| d.sample(rng))
                .unwrap_or(mean_secs),
            Propagation::Exponential { mean_secs } => {
                if mean_secs > 0.0 {
                    Exp::new(1.0 / mean_secs)
                        .map(|d| d.sample(rng))
                        .unwrap_or(mean_secs)
                } else {
                    0.0
                }
            }
        };
        SimTime::from_secs_f64(secs.max(0.0))
    }
}
