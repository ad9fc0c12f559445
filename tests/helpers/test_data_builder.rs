// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use cmkit::domain::organization::Staff;
use cmkit::domain::resource::{Cabinet, Sling};

// ==========================================
// Sling 构建器
// ==========================================

pub struct SlingBuilder {
    rf_id: String,
    name: String,
    sling_type: i64,
    max_tonnage: i64,
    inspect_status: i64,
}

impl SlingBuilder {
    pub fn new(rf_id: &str, name: &str) -> Self {
        Self {
            rf_id: rf_id.to_string(),
            name: name.to_string(),
            sling_type: 1,
            max_tonnage: 5,
            inspect_status: 0,
        }
    }

    pub fn sling_type(mut self, sling_type: i64) -> Self {
        self.sling_type = sling_type;
        self
    }

    pub fn tonnage(mut self, tonnage: i64) -> Self {
        self.max_tonnage = tonnage;
        self
    }

    pub fn inspect_status(mut self, status: i64) -> Self {
        self.inspect_status = status;
        self
    }

    pub fn build(self) -> Sling {
        let mut sling = Sling::new(self.rf_id, self.name);
        sling.sling_type = self.sling_type;
        sling.max_tonnage = self.max_tonnage;
        sling.inspect_status = self.inspect_status;
        sling
    }
}

// ==========================================
// Cabinet 构建器
// ==========================================

pub struct CabinetBuilder {
    name: String,
    grid_count: i64,
    location: String,
}

impl CabinetBuilder {
    pub fn new(name: &str, grid_count: i64) -> Self {
        Self {
            name: name.to_string(),
            grid_count,
            location: String::new(),
        }
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub fn build(self) -> Cabinet {
        let mut cabinet = Cabinet::new(self.name, self.grid_count);
        cabinet.location = self.location;
        cabinet
    }
}

/// 根公司/根部门下的员工
pub fn staff(name: &str) -> Staff {
    Staff::new(name, 1, 1)
}
