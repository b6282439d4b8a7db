//! 时间平滑
//!
//! 有界历史窗口 + 线性递增权重的加权平均：
//! 最旧样本权重 0.5，最新样本权重 1.0，中间线性插值。
//! 只有一个样本时直接返回该样本，不做平均。

use std::collections::VecDeque;

/// 默认窗口大小
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

const OLDEST_WEIGHT: f64 = 0.5;
const NEWEST_WEIGHT: f64 = 1.0;

/// 近因加权滑动窗口（FIFO，满则淘汰最旧样本）
#[derive(Debug, Clone)]
pub struct RecencyWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl RecencyWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 写入新样本并返回平滑值
    pub fn push(&mut self, sample: f64) -> f64 {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.smoothed()
    }

    /// 当前平滑值；窗口为空时为 0
    pub fn smoothed(&self) -> f64 {
        let n = self.samples.len();
        match n {
            0 => 0.0,
            1 => self.samples[0],
            _ => {
                let step = (NEWEST_WEIGHT - OLDEST_WEIGHT) / (n - 1) as f64;
                let (weighted, total) = self.samples.iter().enumerate().fold(
                    (0.0, 0.0),
                    |(acc, wsum), (i, &s)| {
                        let w = OLDEST_WEIGHT + step * i as f64;
                        (acc + w * s, wsum + w)
                    },
                );
                weighted / total
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 从旧到新
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
