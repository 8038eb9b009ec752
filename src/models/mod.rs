/// ML модели: классификатор и разрешение меток

pub mod classifier;
pub mod labels;

pub use classifier::{Classifier, DecisionTree, GaussianNb, LinearModel, RandomForest, TreeNodes};
pub use labels::{crop_for_code, resolve_crop_name, LabelEncoder, CROP_TABLE};
