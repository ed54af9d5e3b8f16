// 領域層：發送模型與調度器使用的介面

pub mod model;
pub mod ports;
