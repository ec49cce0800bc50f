mod property_planner_tests;
mod value_iteration_tests;
