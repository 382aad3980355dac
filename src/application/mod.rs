// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish a run.
//
// Rules for this layer:
//   - No tensor math or model code here
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// The load → train → evaluate → explain workflow
pub mod train_use_case;
