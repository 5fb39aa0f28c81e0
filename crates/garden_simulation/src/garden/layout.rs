//! Раскладка горшков и инструментов на столе
//!
//! Два ряда: задний = ceil(n/2), передний = остаток (n == 1 → один горшок спереди).
//! Инструменты по бокам от переднего ряда: мешок слева, лейка справа.
//! Все координаты — мировые, относительно `table_center` (ось X вдоль стола, +Z от пациента).

use bevy::prelude::*;

use super::config::MAX_SPOTS;

/// Параметры раскладки (метры)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct LayoutTuning {
    /// Центр рабочей зоны на столе
    pub table_center: Vec3,
    /// Рабочая ширина по умолчанию
    pub working_distance_m: f32,
    /// Расстояние между рядами
    pub row_depth_m: f32,
    /// Минимальный шаг горшков по X
    pub min_spacing_m: f32,
    /// Запас на инструмент с каждой стороны внутри рабочей ширины
    pub tool_reserve_m: f32,
    /// Смещение инструмента, если он не влезает внутрь рабочей ширины
    pub tool_outside_offset_m: f32,
    /// Локальный Z инструментов (чуть ближе к пациенту)
    pub tool_local_z: f32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            table_center: Vec3::new(0.0, 0.75, 0.4),
            working_distance_m: 0.60,
            row_depth_m: 0.22,
            min_spacing_m: 0.18,
            tool_reserve_m: 0.22,
            tool_outside_offset_m: 0.12,
            tool_local_z: -0.11,
        }
    }
}

/// Результат раскладки
#[derive(Debug, Clone, PartialEq)]
pub struct PotLayout {
    /// Позиции активных горшков (индекс = PlantSpot::index): сначала задний ряд, потом передний
    pub pots: Vec<Vec3>,
    pub back_count: usize,
    pub front_count: usize,
    pub spacing_x: f32,
    pub seed_bag_home: Vec3,
    pub watering_can_home: Vec3,
    /// false → рабочая ширина мала, инструменты вынесены за ряд
    pub tools_fit_inside: bool,
}

impl PotLayout {
    pub fn spot_position(&self, index: usize) -> Option<Vec3> {
        self.pots.get(index).copied()
    }
}

/// Рассчитать раскладку для `pot_count` горшков и рабочей ширины
pub fn compute_pot_layout(pot_count: u32, working_distance_m: f32, tuning: &LayoutTuning) -> PotLayout {
    let n = (pot_count as usize).clamp(1, MAX_SPOTS);
    let working = if working_distance_m > 0.0 {
        working_distance_m
    } else {
        tuning.working_distance_m
    };
    let reserve = tuning.tool_reserve_m.max(0.0);

    let (back_count, front_count) = if n == 1 { (0, 1) } else { ((n + 1) / 2, n - (n + 1) / 2) };
    let max_row = back_count.max(front_count);

    let spacing_x = if max_row <= 1 {
        0.0
    } else {
        let candidate = (working - 2.0 * reserve) / (max_row - 1) as f32;
        candidate.max(tuning.min_spacing_m)
    };

    let pot_span = if max_row <= 1 { 0.0 } else { spacing_x * (max_row - 1) as f32 };
    let front_half_span = if front_count <= 1 {
        0.0
    } else {
        spacing_x * (front_count - 1) as f32 * 0.5
    };

    let tools_fit_inside = pot_span + 2.0 * reserve <= working + 1e-5;

    let mut pots = Vec::with_capacity(n);
    place_row(&mut pots, back_count, tuning.row_depth_m * 0.5, spacing_x, tuning.table_center);
    place_row(&mut pots, front_count, -tuning.row_depth_m * 0.5, spacing_x, tuning.table_center);

    let tool_x = if tools_fit_inside {
        let half_width = working * 0.5;
        (front_half_span + reserve).max(0.0).min(half_width)
    } else {
        crate::log_warning(&format!(
            "[PotLayout] ⚠️ Working distance {:.2}m too small for {} pots, tools placed outside",
            working, n
        ));
        front_half_span + tuning.tool_outside_offset_m
    };

    let tool_home = |x: f32| tuning.table_center + Vec3::new(x, 0.0, tuning.tool_local_z);

    PotLayout {
        pots,
        back_count,
        front_count,
        spacing_x,
        seed_bag_home: tool_home(-tool_x),
        watering_can_home: tool_home(tool_x),
        tools_fit_inside,
    }
}

fn place_row(pots: &mut Vec<Vec3>, count: usize, z: f32, spacing_x: f32, center: Vec3) {
    for i in 0..count {
        let x = if count == 1 {
            0.0
        } else {
            (i as f32 - (count - 1) as f32 * 0.5) * spacing_x
        };
        pots.push(center + Vec3::new(x, 0.0, z));
    }
}
