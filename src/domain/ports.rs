use crate::domain::model::{BatchResult, HealthyTarget, MeasurementRecord, MeasurementSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 輸出目的地；輸入檔由來源設定自行讀取
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> MeasurementSource;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn compress(&self) -> bool;
    fn max_records(&self) -> Option<usize>;
    fn bmi_target(&self) -> HealthyTarget;

    fn request_timeout_seconds(&self) -> Option<u64> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MeasurementRecord>>;
    async fn transform(&self, data: Vec<MeasurementRecord>) -> Result<BatchResult>;
    async fn load(&self, result: BatchResult) -> Result<String>;
}
