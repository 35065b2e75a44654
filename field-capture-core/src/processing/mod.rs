pub mod resizer;
