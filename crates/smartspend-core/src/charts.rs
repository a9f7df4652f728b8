//! Chart catalog and the user's chart selection

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregation, CategoryCount, CategoryTotal, DailyTotal, MerchantTotal};
use crate::models::ChartType;

/// Display metadata for one catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartInfo {
    pub id: ChartType,
    pub title: &'static str,
    pub description: &'static str,
}

/// The fixed chart catalog, in menu order
pub const CATALOG: [ChartInfo; 4] = [
    ChartInfo {
        id: ChartType::CategoryPie,
        title: "Gastos por Categoría",
        description: "Distribución porcentual de tu dinero.",
    },
    ChartInfo {
        id: ChartType::MerchantBar,
        title: "Top Comercios",
        description: "¿Dónde estás gastando más?",
    },
    ChartInfo {
        id: ChartType::DailyTrend,
        title: "Tendencia Diaria",
        description: "Historial de gastos día a día.",
    },
    ChartInfo {
        id: ChartType::CategoryCount,
        title: "Frecuencia de Compra",
        description: "¿Qué categorías compras más seguido?",
    },
];

pub fn chart_info(id: ChartType) -> ChartInfo {
    match id {
        ChartType::CategoryPie => CATALOG[0],
        ChartType::MerchantBar => CATALOG[1],
        ChartType::DailyTrend => CATALOG[2],
        ChartType::CategoryCount => CATALOG[3],
    }
}

/// Which charts are currently visible.
///
/// Kept as an ordered list so charts render in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSelection {
    active: Vec<ChartType>,
}

impl Default for ChartSelection {
    fn default() -> Self {
        Self {
            active: vec![ChartType::CategoryPie, ChartType::MerchantBar],
        }
    }
}

impl ChartSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `id` if shown, otherwise add it. Returns whether it is now shown.
    pub fn toggle(&mut self, id: ChartType) -> bool {
        if let Some(pos) = self.active.iter().position(|c| *c == id) {
            self.active.remove(pos);
            false
        } else {
            self.active.push(id);
            true
        }
    }

    pub fn is_visible(&self, id: ChartType) -> bool {
        self.active.contains(&id)
    }

    pub fn active(&self) -> &[ChartType] {
        &self.active
    }

    /// Datasets for the selected charts, in selection order
    pub fn visible_datasets(&self, aggregation: &Aggregation) -> Vec<ChartDataset> {
        self.active
            .iter()
            .map(|id| ChartDataset::from_aggregation(*id, aggregation))
            .collect()
    }
}

/// Data points backing one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    CategoryPie(Vec<CategoryTotal>),
    MerchantBar(Vec<MerchantTotal>),
    DailyTrend(Vec<DailyTotal>),
    CategoryCount(Vec<CategoryCount>),
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::CategoryPie(rows) => rows.is_empty(),
            Self::MerchantBar(rows) => rows.is_empty(),
            Self::DailyTrend(rows) => rows.is_empty(),
            Self::CategoryCount(rows) => rows.is_empty(),
        }
    }
}

/// A chart ready to render: catalog metadata plus its data points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub title: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub data: ChartData,
}

impl ChartDataset {
    pub fn from_aggregation(id: ChartType, aggregation: &Aggregation) -> Self {
        let info = chart_info(id);
        let data = match id {
            ChartType::CategoryPie => ChartData::CategoryPie(aggregation.category_totals.clone()),
            ChartType::MerchantBar => ChartData::MerchantBar(aggregation.merchant_totals.clone()),
            ChartType::DailyTrend => ChartData::DailyTrend(aggregation.daily_totals.clone()),
            ChartType::CategoryCount => {
                ChartData::CategoryCount(aggregation.category_counts.clone())
            }
        };
        Self {
            title: info.title,
            description: info.description,
            data,
        }
    }

    pub fn chart_type(&self) -> ChartType {
        match self.data {
            ChartData::CategoryPie(_) => ChartType::CategoryPie,
            ChartData::MerchantBar(_) => ChartType::MerchantBar,
            ChartData::DailyTrend(_) => ChartType::DailyTrend,
            ChartData::CategoryCount(_) => ChartType::CategoryCount,
        }
    }
}
